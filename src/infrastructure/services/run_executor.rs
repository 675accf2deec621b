//! Run executor - drives one queued run to a terminal state
//!
//! Write ordering within an execution is fixed: the `running` transition
//! is persisted before any scoring starts, result rows are replaced
//! before the summary, and the `done` flip is last. A crash therefore
//! leaves the run either visibly in-flight or fully terminal, never with
//! a summary that disagrees with its rows.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::dataset::DatasetRepository;
use crate::domain::error::DomainError;
use crate::domain::model::ModelRepository;
use crate::domain::run::{InferenceResult, InferenceRun, RunId, RunRepository, RunSummary};
use crate::domain::scorer::{SampleResult, ScorerParams};
use crate::infrastructure::artifact::ArtifactStore;
use crate::infrastructure::scorer::ScorerRegistry;

#[derive(Debug)]
pub struct RunExecutor {
    runs: Arc<dyn RunRepository>,
    datasets: Arc<dyn DatasetRepository>,
    models: Arc<dyn ModelRepository>,
    registry: Arc<ScorerRegistry>,
    artifacts: ArtifactStore,
}

impl RunExecutor {
    pub fn new(
        runs: Arc<dyn RunRepository>,
        datasets: Arc<dyn DatasetRepository>,
        models: Arc<dyn ModelRepository>,
        registry: Arc<ScorerRegistry>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            runs,
            datasets,
            models,
            registry,
            artifacts,
        }
    }

    /// Execute a queued run to completion.
    ///
    /// Never returns an error: any fault is recorded on the run itself
    /// as a `failed` transition with the fault message.
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn execute(&self, run_id: RunId) {
        if let Err(error) = self.try_execute(&run_id).await {
            warn!(run_id = %run_id, error = %error, "Run execution failed");
            self.record_failure(&run_id, &error).await;
        }
    }

    async fn try_execute(&self, run_id: &RunId) -> Result<(), DomainError> {
        let mut run = self.get_required(run_id).await?;

        run.mark_running()?;
        let run = self.runs.update(&run).await?;
        info!(run_id = %run_id, "Run started");

        if !self.datasets.exists(run.dataset_id()).await? {
            return Err(DomainError::not_found(format!(
                "Dataset '{}'",
                run.dataset_id()
            )));
        }
        let model = self
            .models
            .get(run.model_id())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Model '{}'", run.model_id())))?;

        // The model declares what it scores; the dataset only supplies inputs.
        let scorer = self.registry.resolve(&model.backend, model.modality)?;
        debug!(
            run_id = %run_id,
            scorer = scorer.name(),
            modality = %model.modality,
            "Resolved scorer"
        );

        let dataset_dir = self
            .artifacts
            .dataset_raw_dir(run.project_id(), run.dataset_id());
        let params = ScorerParams::new(run.params().clone());
        let samples = scorer.score(&dataset_dir, &params).await?;

        let output_dir = self
            .artifacts
            .ensure_run_output_dir(run.project_id(), run.id())
            .await?;

        self.write_manifests(&output_dir, &samples).await;

        let results: Vec<InferenceResult> = samples
            .iter()
            .map(|sample| InferenceResult::from_sample(run.id(), sample))
            .collect();
        self.runs.replace_results(run.id(), results).await?;

        let summary = RunSummary::tally(&samples, output_dir.to_string_lossy());

        let mut run = run;
        run.mark_done(summary)?;
        let run = self.runs.update(&run).await?;

        info!(
            run_id = %run_id,
            total = run.summary().map(|s| s.total).unwrap_or(0),
            ok = run.summary().map(|s| s.ok).unwrap_or(0),
            "Run finished"
        );

        Ok(())
    }

    /// Per-sample manifests are best-effort: a manifest write failure
    /// must not fail the run, because the result rows are the source of
    /// truth.
    async fn write_manifests(&self, output_dir: &std::path::Path, samples: &[SampleResult]) {
        for sample in samples {
            let Some(output_path) = sample.output_path.as_deref() else {
                continue;
            };

            if !std::path::Path::new(output_path).exists() {
                continue;
            }

            if let Err(error) = self
                .artifacts
                .write_manifest(output_dir, &sample.sample_key, sample)
                .await
            {
                warn!(
                    sample_key = %sample.sample_key,
                    error = %error,
                    "Failed to write sample manifest"
                );
            }
        }
    }

    async fn record_failure(&self, run_id: &RunId, error: &DomainError) {
        let run = match self.runs.get(run_id).await {
            Ok(Some(run)) => run,
            Ok(None) => {
                warn!(run_id = %run_id, "Failed run no longer exists");
                return;
            }
            Err(store_error) => {
                warn!(run_id = %run_id, error = %store_error, "Could not load failed run");
                return;
            }
        };

        let mut run: InferenceRun = run;

        if let Err(transition_error) = run.mark_failed(error.to_string()) {
            warn!(run_id = %run_id, error = %transition_error, "Could not mark run as failed");
            return;
        }

        if let Err(store_error) = self.runs.update(&run).await {
            warn!(run_id = %run_id, error = %store_error, "Could not persist failed run");
        }
    }

    async fn get_required(&self, run_id: &RunId) -> Result<InferenceRun, DomainError> {
        self.runs
            .get(run_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Run '{}'", run_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::dataset::Dataset;
    use crate::domain::model::Model;
    use crate::domain::project::ProjectId;
    use crate::domain::run::RunStatus;
    use crate::domain::scorer::{Modality, SampleResult, Scorer, Verdict};
    use crate::infrastructure::dataset::InMemoryDatasetRepository;
    use crate::infrastructure::model::InMemoryModelRepository;
    use crate::infrastructure::run::InMemoryRunRepository;

    /// Deterministic scorer emitting a fixed ok/ng pair
    #[derive(Debug)]
    struct StubScorer;

    #[async_trait]
    impl Scorer for StubScorer {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn score(
            &self,
            _dataset_dir: &Path,
            params: &ScorerParams,
        ) -> Result<Vec<SampleResult>, DomainError> {
            let threshold = params.threshold();

            Ok(vec![
                SampleResult {
                    sample_key: "a.png".to_string(),
                    score: Some(0.9),
                    verdict: Some(Verdict::from_score(0.9, threshold)),
                    output_path: None,
                    detail: json!({}),
                    summary: json!({"threshold": threshold}),
                },
                SampleResult {
                    sample_key: "b.png".to_string(),
                    score: Some(0.1),
                    verdict: Some(Verdict::from_score(0.1, threshold)),
                    output_path: None,
                    detail: json!({}),
                    summary: json!({"threshold": threshold}),
                },
            ])
        }
    }

    struct Fixture {
        runs: Arc<InMemoryRunRepository>,
        executor: RunExecutor,
        run_id: RunId,
        _storage: tempfile::TempDir,
    }

    async fn fixture(backend: &str) -> Fixture {
        fixture_with_modalities(backend, Modality::Vision, Modality::Vision).await
    }

    /// The stub scorer is registered under the model's modality only.
    async fn fixture_with_modalities(
        backend: &str,
        dataset_modality: Modality,
        model_modality: Modality,
    ) -> Fixture {
        let runs = Arc::new(InMemoryRunRepository::new());
        let datasets = Arc::new(InMemoryDatasetRepository::new());
        let models = Arc::new(InMemoryModelRepository::new());

        let project_id = ProjectId::generate();
        let dataset = datasets
            .create(Dataset::new(project_id.clone(), "line-a", dataset_modality))
            .await
            .unwrap();
        let model = models
            .create(Model::new("Stub v1", model_modality, backend, "v1"))
            .await
            .unwrap();

        let run = runs
            .create(InferenceRun::new(
                project_id,
                dataset.id.clone(),
                model.id.clone(),
                json!({"threshold": 0.5}),
            ))
            .await
            .unwrap();
        let run_id = run.id().clone();

        let mut registry = ScorerRegistry::new();
        registry.register("stub", model_modality, Arc::new(StubScorer));

        let storage = tempfile::tempdir().unwrap();
        let executor = RunExecutor::new(
            runs.clone(),
            datasets,
            models,
            Arc::new(registry),
            ArtifactStore::new(storage.path()),
        );

        Fixture {
            runs,
            executor,
            run_id,
            _storage: storage,
        }
    }

    #[tokio::test]
    async fn test_successful_run_reaches_done() {
        let fx = fixture("stub").await;

        fx.executor.execute(fx.run_id.clone()).await;

        let run = fx.runs.get(&fx.run_id).await.unwrap().unwrap();
        assert_eq!(run.status(), RunStatus::Done);
        assert!(run.started_at().is_some());
        assert!(run.finished_at().is_some());
        assert!(run.error_message().is_none());

        let summary = run.summary().unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.ng, 1);
        assert!(summary.output_dir.contains(fx.run_id.as_str()));
    }

    #[tokio::test]
    async fn test_results_persisted_in_scorer_order() {
        let fx = fixture("stub").await;

        fx.executor.execute(fx.run_id.clone()).await;

        let results = fx.runs.list_results(&fx.run_id, 50, 0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].sample_key, "a.png");
        assert_eq!(results[1].sample_key, "b.png");
        assert_eq!(results[0].verdict, Some(Verdict::Ok));
        assert_eq!(results[1].verdict, Some(Verdict::Ng));
    }

    #[tokio::test]
    async fn test_scorer_resolution_follows_model_modality() {
        // A timeseries model pointed at a vision-labeled dataset still
        // resolves the timeseries scorer; the dataset does not pick it.
        let fx =
            fixture_with_modalities("stub", Modality::Vision, Modality::Timeseries).await;

        fx.executor.execute(fx.run_id.clone()).await;

        let run = fx.runs.get(&fx.run_id).await.unwrap().unwrap();
        assert_eq!(run.status(), RunStatus::Done);
        assert!(run.error_message().is_none());
        assert_eq!(run.summary().unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_unknown_backend_fails_the_run() {
        let fx = fixture("onnx").await;

        fx.executor.execute(fx.run_id.clone()).await;

        let run = fx.runs.get(&fx.run_id).await.unwrap().unwrap();
        assert_eq!(run.status(), RunStatus::Failed);
        assert!(run.summary().is_none());
        assert!(run.finished_at().is_some());
        assert!(
            run.error_message().unwrap().contains("Unsupported backend"),
            "error message should carry the fault: {:?}",
            run.error_message()
        );

        let results = fx.runs.list_results(&fx.run_id, 50, 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_executing_terminal_run_is_harmless() {
        let fx = fixture("stub").await;

        fx.executor.execute(fx.run_id.clone()).await;
        let first = fx.runs.get(&fx.run_id).await.unwrap().unwrap();
        assert_eq!(first.status(), RunStatus::Done);

        // Second attempt trips the queued -> running guard and cannot
        // overwrite the terminal state.
        fx.executor.execute(fx.run_id.clone()).await;

        let second = fx.runs.get(&fx.run_id).await.unwrap().unwrap();
        assert_eq!(second.status(), RunStatus::Done);
        assert_eq!(second.summary(), first.summary());
    }

    #[tokio::test]
    async fn test_missing_run_does_not_panic() {
        let fx = fixture("stub").await;

        fx.executor.execute(RunId::generate()).await;
    }
}
