//! Shared application state for API handlers

use std::sync::Arc;

use crate::domain::dataset::DatasetRepository;
use crate::domain::model::ModelRepository;
use crate::domain::project::ProjectRepository;
use crate::domain::run::RunRepository;
use crate::domain::validation::ValidationRepository;
use crate::infrastructure::artifact::ArtifactStore;
use crate::infrastructure::services::{IngestService, RunScheduler};

#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ProjectRepository>,
    pub datasets: Arc<dyn DatasetRepository>,
    pub models: Arc<dyn ModelRepository>,
    pub runs: Arc<dyn RunRepository>,
    pub validations: Arc<dyn ValidationRepository>,
    pub scheduler: Arc<RunScheduler>,
    pub ingest: Arc<IngestService>,
    pub artifacts: ArtifactStore,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        datasets: Arc<dyn DatasetRepository>,
        models: Arc<dyn ModelRepository>,
        runs: Arc<dyn RunRepository>,
        validations: Arc<dyn ValidationRepository>,
        scheduler: Arc<RunScheduler>,
        ingest: Arc<IngestService>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            projects,
            datasets,
            models,
            runs,
            validations,
            scheduler,
            ingest,
            artifacts,
        }
    }
}
