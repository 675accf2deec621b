//! Inference run domain - the core lifecycle

mod entity;
mod error;
pub mod repository;

pub use entity::{InferenceResult, InferenceRun, ResultId, RunId, RunStatus, RunSummary};
pub use error::RunError;
pub use repository::RunRepository;
