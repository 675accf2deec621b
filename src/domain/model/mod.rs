//! Model domain

mod entity;
mod repository;

pub use entity::{Model, ModelId};
pub use repository::ModelRepository;

#[cfg(test)]
pub use repository::tests;
