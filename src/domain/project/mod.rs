//! Project domain

mod entity;
mod repository;

pub use entity::{Project, ProjectId};
pub use repository::ProjectRepository;

#[cfg(test)]
pub use repository::tests;
