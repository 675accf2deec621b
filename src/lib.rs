//! Inferlab API
//!
//! A backend for managing vision/timeseries inference experiments:
//! - Projects, datasets and file uploads with metadata extraction
//! - A model catalog backed by pluggable scoring adapters
//! - Asynchronous inference runs with per-sample results
//! - Human validations of scored samples

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use config::StorageBackend;
use domain::dataset::DatasetRepository;
use domain::model::{Model, ModelRepository};
use domain::project::ProjectRepository;
use domain::run::RunRepository;
use domain::scorer::Modality;
use domain::validation::ValidationRepository;
use infrastructure::artifact::ArtifactStore;
use infrastructure::dataset::{InMemoryDatasetRepository, PgDatasetRepository};
use infrastructure::model::{InMemoryModelRepository, PgModelRepository};
use infrastructure::project::{InMemoryProjectRepository, PgProjectRepository};
use infrastructure::run::{InMemoryRunRepository, PgRunRepository};
use infrastructure::scorer::ScorerRegistry;
use infrastructure::services::{IngestService, RunExecutor, RunScheduler};
use infrastructure::validation::{InMemoryValidationRepository, PgValidationRepository};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let artifacts = ArtifactStore::new(&config.storage.root);
    tokio::fs::create_dir_all(artifacts.root()).await?;

    let (projects, datasets, models, runs, validations) = create_repositories(config).await?;

    seed_default_models(&models).await?;

    let registry = Arc::new(ScorerRegistry::with_builtins());
    let executor = Arc::new(RunExecutor::new(
        runs.clone(),
        datasets.clone(),
        models.clone(),
        registry,
        artifacts.clone(),
    ));
    let scheduler = Arc::new(RunScheduler::new(
        projects.clone(),
        datasets.clone(),
        models.clone(),
        runs.clone(),
        executor,
    ));
    let ingest = Arc::new(IngestService::new(datasets.clone(), artifacts.clone()));

    Ok(AppState::new(
        projects,
        datasets,
        models,
        runs,
        validations,
        scheduler,
        ingest,
        artifacts,
    ))
}

type Repositories = (
    Arc<dyn ProjectRepository>,
    Arc<dyn DatasetRepository>,
    Arc<dyn ModelRepository>,
    Arc<dyn RunRepository>,
    Arc<dyn ValidationRepository>,
);

async fn create_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL")
                .ok()
                .or_else(|| config.storage.database_url.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL is required for the postgres backend")
                })?;

            info!("Connecting to PostgreSQL...");
            let pool = infrastructure::db::connect(&database_url).await?;
            info!("PostgreSQL connection established");

            let projects = PgProjectRepository::new(pool.clone());
            projects.ensure_table().await?;
            let datasets = PgDatasetRepository::new(pool.clone());
            datasets.ensure_table().await?;
            let models = PgModelRepository::new(pool.clone());
            models.ensure_table().await?;
            let runs = PgRunRepository::new(pool.clone());
            runs.ensure_table().await?;
            let validations = PgValidationRepository::new(pool);
            validations.ensure_table().await?;

            Ok((
                Arc::new(projects),
                Arc::new(datasets),
                Arc::new(models),
                Arc::new(runs),
                Arc::new(validations),
            ))
        }
        StorageBackend::Memory => {
            info!("Using in-memory repositories");

            Ok((
                Arc::new(InMemoryProjectRepository::new()),
                Arc::new(InMemoryDatasetRepository::new()),
                Arc::new(InMemoryModelRepository::new()),
                Arc::new(InMemoryRunRepository::new()),
                Arc::new(InMemoryValidationRepository::new()),
            ))
        }
    }
}

/// Register the built-in dummy models unless they already exist
async fn seed_default_models(models: &Arc<dyn ModelRepository>) -> anyhow::Result<()> {
    let defaults = [
        ("Dummy Vision v1", Modality::Vision),
        ("Dummy Timeseries v1", Modality::Timeseries),
        ("Dummy Mixed v1", Modality::Mixed),
    ];

    for (name, modality) in defaults {
        if models.get_by_name(name).await?.is_some() {
            continue;
        }

        let model = models.create(Model::new(name, modality, "dummy", "v1")).await?;
        info!(model_id = %model.id, name = %model.name, "Seeded model");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let models: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());

        seed_default_models(&models).await.unwrap();
        seed_default_models(&models).await.unwrap();

        let all = models.list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let vision = models.list(Some(Modality::Vision)).await.unwrap();
        assert_eq!(vision.len(), 1);
        assert_eq!(vision[0].name, "Dummy Vision v1");
        assert_eq!(vision[0].backend, "dummy");
    }
}
