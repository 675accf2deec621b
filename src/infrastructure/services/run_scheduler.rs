//! Run scheduler - run creation, dispatch and result queries
//!
//! Dispatch is at-most-once per process: a run id enters the in-flight
//! set before its task is spawned and leaves it when the task settles,
//! so a duplicate dispatch request while the run is executing is a no-op.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::dataset::{DatasetId, DatasetRepository};
use crate::domain::error::DomainError;
use crate::domain::model::{ModelId, ModelRepository};
use crate::domain::project::{ProjectId, ProjectRepository};
use crate::domain::run::{InferenceResult, InferenceRun, RunId, RunRepository};

use super::RunExecutor;

/// Results pagination bounds
pub const RESULTS_DEFAULT_LIMIT: usize = 50;
pub const RESULTS_MAX_LIMIT: usize = 500;

/// One page of a run's results
#[derive(Debug)]
pub struct ResultsPage {
    pub results: Vec<InferenceResult>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug)]
pub struct RunScheduler {
    projects: Arc<dyn ProjectRepository>,
    datasets: Arc<dyn DatasetRepository>,
    models: Arc<dyn ModelRepository>,
    runs: Arc<dyn RunRepository>,
    executor: Arc<RunExecutor>,
    in_flight: Arc<Mutex<HashSet<RunId>>>,
}

impl RunScheduler {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        datasets: Arc<dyn DatasetRepository>,
        models: Arc<dyn ModelRepository>,
        runs: Arc<dyn RunRepository>,
        executor: Arc<RunExecutor>,
    ) -> Self {
        Self {
            projects,
            datasets,
            models,
            runs,
            executor,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Validate references, persist a queued run and dispatch it.
    ///
    /// References are checked in project, dataset, model order and the
    /// first missing one fails the request. Scorer resolution is NOT
    /// checked here: an unknown backend queues fine and fails during
    /// execution, leaving the fault on the run record.
    #[instrument(skip(self, params))]
    pub async fn create_run(
        &self,
        project_id: ProjectId,
        dataset_id: DatasetId,
        model_id: ModelId,
        params: Value,
    ) -> Result<InferenceRun, DomainError> {
        if !self.projects.exists(&project_id).await? {
            return Err(DomainError::not_found(format!("Project '{}'", project_id)));
        }
        if !self.datasets.exists(&dataset_id).await? {
            return Err(DomainError::not_found(format!("Dataset '{}'", dataset_id)));
        }
        if self.models.get(&model_id).await?.is_none() {
            return Err(DomainError::not_found(format!("Model '{}'", model_id)));
        }

        let run = InferenceRun::new(project_id, dataset_id, model_id, params);
        let run = self.runs.create(run).await?;

        info!(run_id = %run.id(), "Queued inference run");
        self.dispatch(run.id().clone());

        Ok(run)
    }

    pub async fn get_run(&self, run_id: &RunId) -> Result<InferenceRun, DomainError> {
        self.runs
            .get(run_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Run '{}'", run_id)))
    }

    /// A stable page of the run's results in creation order
    #[instrument(skip(self))]
    pub async fn list_results(
        &self,
        run_id: &RunId,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<ResultsPage, DomainError> {
        let limit = limit.unwrap_or(RESULTS_DEFAULT_LIMIT);
        let offset = offset.unwrap_or(0);

        if limit < 1 || limit > RESULTS_MAX_LIMIT {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {}",
                RESULTS_MAX_LIMIT
            )));
        }

        self.get_run(run_id).await?;

        let results = self.runs.list_results(run_id, limit, offset).await?;
        let total = self.runs.count_results(run_id).await?;

        Ok(ResultsPage {
            results,
            total,
            limit,
            offset,
        })
    }

    /// Spawn a background task driving the run, unless one is already
    /// in flight for this run id
    fn dispatch(&self, run_id: RunId) {
        {
            let mut in_flight = match self.in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            if !in_flight.insert(run_id.clone()) {
                warn!(run_id = %run_id, "Run already dispatched, skipping");
                return;
            }
        }

        let executor = self.executor.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            executor.execute(run_id.clone()).await;

            let mut in_flight = match in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            in_flight.remove(&run_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::domain::dataset::Dataset;
    use crate::domain::model::Model;
    use crate::domain::project::Project;
    use crate::domain::run::RunStatus;
    use crate::domain::scorer::Modality;
    use crate::infrastructure::artifact::ArtifactStore;
    use crate::infrastructure::dataset::InMemoryDatasetRepository;
    use crate::infrastructure::model::InMemoryModelRepository;
    use crate::infrastructure::project::InMemoryProjectRepository;
    use crate::infrastructure::run::InMemoryRunRepository;
    use crate::infrastructure::scorer::ScorerRegistry;

    struct Fixture {
        scheduler: RunScheduler,
        runs: Arc<InMemoryRunRepository>,
        artifacts: ArtifactStore,
        project: Project,
        dataset: Dataset,
        model: Model,
        _storage: tempfile::TempDir,
    }

    impl Fixture {
        /// Lay down the dataset's raw directory as an upload would
        async fn seed_raw_dir(&self, files: &[(&str, &[u8])]) {
            let raw_dir = self
                .artifacts
                .dataset_raw_dir(&self.project.id, &self.dataset.id);
            tokio::fs::create_dir_all(&raw_dir).await.unwrap();

            for (name, contents) in files {
                tokio::fs::write(raw_dir.join(name), contents).await.unwrap();
            }
        }
    }

    async fn fixture() -> Fixture {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let datasets = Arc::new(InMemoryDatasetRepository::new());
        let models = Arc::new(InMemoryModelRepository::new());
        let runs = Arc::new(InMemoryRunRepository::new());

        let project = projects
            .create(Project::new("line-a", None))
            .await
            .unwrap();
        let dataset = datasets
            .create(Dataset::new(project.id.clone(), "shift-1", Modality::Vision))
            .await
            .unwrap();
        let model = models
            .create(Model::new("Dummy Vision v1", Modality::Vision, "dummy", "v1"))
            .await
            .unwrap();

        let storage = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(storage.path());
        let executor = Arc::new(RunExecutor::new(
            runs.clone(),
            datasets.clone(),
            models.clone(),
            Arc::new(ScorerRegistry::with_builtins()),
            artifacts.clone(),
        ));

        let scheduler = RunScheduler::new(projects, datasets, models.clone(), runs.clone(), executor);

        Fixture {
            scheduler,
            runs,
            artifacts,
            project,
            dataset,
            model,
            _storage: storage,
        }
    }

    async fn wait_terminal(runs: &InMemoryRunRepository, run_id: &RunId) -> InferenceRun {
        for _ in 0..200 {
            let run = runs.get(run_id).await.unwrap().unwrap();
            if run.is_terminal() {
                return run;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("run never reached a terminal state");
    }

    #[tokio::test]
    async fn test_create_run_queues_and_completes() {
        let fx = fixture().await;
        fx.seed_raw_dir(&[("cam1.png", b"fake")]).await;

        let run = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                fx.dataset.id.clone(),
                fx.model.id.clone(),
                json!({"threshold": 0.5}),
            )
            .await
            .unwrap();

        // The immediate response is the queued record.
        assert_eq!(run.status(), RunStatus::Queued);

        let finished = wait_terminal(&fx.runs, run.id()).await;
        assert_eq!(finished.status(), RunStatus::Done);
        assert!(finished.error_message().is_none());
        assert_eq!(finished.summary().unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_run_against_dataset_without_uploads_fails() {
        let fx = fixture().await;

        // No file was ever ingested, so the raw directory does not exist
        // and scoring cannot start.
        let run = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                fx.dataset.id.clone(),
                fx.model.id.clone(),
                json!({}),
            )
            .await
            .unwrap();

        let finished = wait_terminal(&fx.runs, run.id()).await;
        assert_eq!(finished.status(), RunStatus::Failed);
        assert!(finished.error_message().is_some());
        assert!(finished.summary().is_none());
    }

    #[tokio::test]
    async fn test_create_run_missing_references() {
        let fx = fixture().await;

        let err = fx
            .scheduler
            .create_run(
                ProjectId::generate(),
                fx.dataset.id.clone(),
                fx.model.id.clone(),
                json!({}),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Project"));

        let err = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                DatasetId::generate(),
                fx.model.id.clone(),
                json!({}),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Dataset"));

        let err = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                fx.dataset.id.clone(),
                ModelId::generate(),
                json!({}),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Model"));
    }

    #[tokio::test]
    async fn test_unknown_backend_fails_after_queueing() {
        let fx = fixture().await;

        let model = fx
            .scheduler
            .models
            .create(Model::new("Orphan", Modality::Vision, "onnx", "v1"))
            .await
            .unwrap();

        let run = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                fx.dataset.id.clone(),
                model.id.clone(),
                json!({}),
            )
            .await
            .unwrap();

        let finished = wait_terminal(&fx.runs, run.id()).await;
        assert_eq!(finished.status(), RunStatus::Failed);
        assert!(finished.error_message().unwrap().contains("onnx"));
    }

    #[tokio::test]
    async fn test_list_results_validates_limit() {
        let fx = fixture().await;
        fx.seed_raw_dir(&[]).await;

        let run = fx
            .scheduler
            .create_run(
                fx.project.id.clone(),
                fx.dataset.id.clone(),
                fx.model.id.clone(),
                json!({}),
            )
            .await
            .unwrap();
        wait_terminal(&fx.runs, run.id()).await;

        assert!(fx.scheduler.list_results(run.id(), Some(0), None).await.is_err());
        assert!(fx.scheduler.list_results(run.id(), Some(501), None).await.is_err());

        let page = fx.scheduler.list_results(run.id(), None, None).await.unwrap();
        assert_eq!(page.limit, RESULTS_DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);
    }

    #[tokio::test]
    async fn test_list_results_unknown_run() {
        let fx = fixture().await;

        let err = fx
            .scheduler
            .list_results(&RunId::generate(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
