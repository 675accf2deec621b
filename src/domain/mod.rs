//! Domain layer - entities, repository traits and the scorer capability

pub mod dataset;
pub mod error;
pub(crate) mod id;
pub mod model;
pub mod project;
pub mod run;
pub mod scorer;
pub mod validation;

pub use dataset::{Dataset, DatasetFile, DatasetFileId, DatasetId, DatasetRepository};
pub use error::DomainError;
pub use model::{Model, ModelId, ModelRepository};
pub use project::{Project, ProjectId, ProjectRepository};
pub use run::{
    InferenceResult, InferenceRun, ResultId, RunId, RunRepository, RunStatus, RunSummary,
};
pub use scorer::{Modality, SampleResult, Scorer, ScorerParams, Verdict};
pub use validation::{Validation, ValidationId, ValidationRepository};
