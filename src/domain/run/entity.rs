//! Inference run entities and the run status state machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RunError;
use crate::domain::dataset::DatasetId;
use crate::domain::id::entity_id;
use crate::domain::model::ModelId;
use crate::domain::project::ProjectId;
use crate::domain::scorer::{SampleResult, Verdict};

entity_id!(
    /// Validated run identifier: `run-{uuid}`
    RunId,
    "run-"
);

entity_id!(
    /// Validated result identifier: `res-{uuid}`
    ResultId,
    "res-"
);

/// Status of an inference run
///
/// Transitions follow exactly `queued -> running -> {done | failed}`.
/// Terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Persisted, waiting for dispatch
    #[default]
    Queued,

    /// Executor is driving the run
    Running,

    /// Completed with a summary
    Done,

    /// Completed with an error message
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn can_transition_to(&self, target: RunStatus) -> bool {
        matches!(
            (self, target),
            (Self::Queued, Self::Running)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Failed)
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Aggregate counts persisted when a run completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: u64,
    pub ok: u64,
    pub ng: u64,
    /// Where the run's artifact manifests were written
    pub output_dir: String,
}

impl RunSummary {
    /// Tally verdicts over a produced sample set
    pub fn tally(samples: &[SampleResult], output_dir: impl Into<String>) -> Self {
        let total = samples.len() as u64;
        let ok = samples
            .iter()
            .filter(|s| s.verdict == Some(Verdict::Ok))
            .count() as u64;

        Self {
            total,
            ok,
            ng: total - ok,
            output_dir: output_dir.into(),
        }
    }
}

/// One execution attempt of a model against a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRun {
    id: RunId,
    project_id: ProjectId,
    dataset_id: DatasetId,
    model_id: ModelId,
    status: RunStatus,

    /// Opaque configuration passed verbatim to the scorer
    params: Value,

    /// Populated only on `done`; mutually exclusive with `error_message`
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RunSummary>,

    /// Populated only on `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,

    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl InferenceRun {
    /// Create a new queued run
    pub fn new(
        project_id: ProjectId,
        dataset_id: DatasetId,
        model_id: ModelId,
        params: Value,
    ) -> Self {
        Self {
            id: RunId::generate(),
            project_id,
            dataset_id,
            model_id,
            status: RunStatus::Queued,
            params,
            summary: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset_id
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Enter `running`; sets `started_at`
    pub fn mark_running(&mut self) -> Result<(), RunError> {
        if !self.status.can_transition_to(RunStatus::Running) {
            return Err(RunError::invalid_transition(
                &self.status.to_string(),
                "running",
                "run is not queued",
            ));
        }
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Enter `done` with the final summary; sets `finished_at`
    pub fn mark_done(&mut self, summary: RunSummary) -> Result<(), RunError> {
        if !self.status.can_transition_to(RunStatus::Done) {
            return Err(RunError::invalid_transition(
                &self.status.to_string(),
                "done",
                "run is not running",
            ));
        }
        self.status = RunStatus::Done;
        self.summary = Some(summary);
        self.error_message = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Enter `failed` with a human-readable fault description; sets `finished_at`
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), RunError> {
        if !self.status.can_transition_to(RunStatus::Failed) {
            return Err(RunError::invalid_transition(
                &self.status.to_string(),
                "failed",
                "run is not running",
            ));
        }
        self.status = RunStatus::Failed;
        self.error_message = Some(error.into());
        self.summary = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}

/// One persisted per-sample result row of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    pub id: ResultId,
    pub run_id: RunId,
    /// Unique within the run
    pub sample_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Opaque payload documenting how the score was derived
    pub detail: Value,
    /// The rule/threshold that produced the verdict
    pub summary: Value,
    pub created_at: DateTime<Utc>,
}

impl InferenceResult {
    /// Materialize a scorer output as a result row of `run_id`
    pub fn from_sample(run_id: &RunId, sample: &SampleResult) -> Self {
        Self {
            id: ResultId::generate(),
            run_id: run_id.clone(),
            sample_key: sample.sample_key.clone(),
            score: sample.score,
            verdict: sample.verdict,
            output_path: sample.output_path.clone(),
            detail: sample.detail.clone(),
            summary: sample.summary.clone(),
            created_at: Utc::now(),
        }
    }
}
