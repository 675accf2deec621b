//! Dataset domain

mod entity;
mod repository;

pub use entity::{Dataset, DatasetFile, DatasetFileId, DatasetId};
pub use repository::DatasetRepository;

#[cfg(test)]
pub use repository::tests;
