//! Validation domain

mod entity;
mod repository;

pub use entity::{Validation, ValidationId};
pub use repository::ValidationRepository;

#[cfg(test)]
pub use repository::tests;
