//! Inference run endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::dataset::DatasetId;
use crate::domain::model::ModelId;
use crate::domain::project::ProjectId;
use crate::domain::run::{InferenceResult, InferenceRun, RunId, RunStatus, RunSummary};
use crate::domain::scorer::Verdict;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunRequest {
    pub project_id: String,
    pub dataset_id: String,
    pub model_id: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub id: String,
    pub project_id: String,
    pub dataset_id: String,
    pub model_id: String,
    pub status: RunStatus,
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl From<&InferenceRun> for RunResponse {
    fn from(run: &InferenceRun) -> Self {
        Self {
            id: run.id().to_string(),
            project_id: run.project_id().to_string(),
            dataset_id: run.dataset_id().to_string(),
            model_id: run.model_id().to_string(),
            status: run.status(),
            params: run.params().clone(),
            summary: run.summary().cloned(),
            error_message: run.error_message().map(str::to_string),
            created_at: run.created_at().to_rfc3339(),
            started_at: run.started_at().map(|t| t.to_rfc3339()),
            finished_at: run.finished_at().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResultsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse {
    pub id: String,
    pub run_id: String,
    pub sample_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    pub detail: Value,
    pub summary: Value,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_url: Option<String>,
}

impl ResultResponse {
    fn new(result: &InferenceResult, static_url: Option<String>) -> Self {
        Self {
            id: result.id.to_string(),
            run_id: result.run_id.to_string(),
            sample_key: result.sample_key.clone(),
            score: result.score,
            verdict: result.verdict,
            output_path: result.output_path.clone(),
            detail: result.detail.clone(),
            summary: result.summary.clone(),
            created_at: result.created_at.to_rfc3339(),
            static_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResultsResponse {
    pub results: Vec<ResultResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// POST /api/inference-runs
pub async fn create_run(
    State(state): State<AppState>,
    Json(request): Json<CreateRunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let project_id = ProjectId::new(request.project_id)?;
    let dataset_id = DatasetId::new(request.dataset_id)?;
    let model_id = ModelId::new(request.model_id)?;
    let params = request.params.unwrap_or_else(|| Value::Object(Default::default()));

    let run = state
        .scheduler
        .create_run(project_id, dataset_id, model_id, params)
        .await?;

    info!(run_id = %run.id(), "Accepted inference run");

    Ok(Json(RunResponse::from(&run)))
}

/// GET /api/inference-runs/:run_id
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    let run_id = RunId::new(run_id)?;
    let run = state.scheduler.get_run(&run_id).await?;

    Ok(Json(RunResponse::from(&run)))
}

/// GET /api/inference-runs/:run_id/results?limit=&offset=
pub async fn list_results(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    Query(query): Query<ListResultsQuery>,
) -> Result<Json<ListResultsResponse>, ApiError> {
    let run_id = RunId::new(run_id)?;

    let page = state
        .scheduler
        .list_results(&run_id, query.limit, query.offset)
        .await?;

    let results = page
        .results
        .iter()
        .map(|result| {
            let static_url = result
                .output_path
                .as_deref()
                .and_then(|path| state.artifacts.static_url(path));
            ResultResponse::new(result, static_url)
        })
        .collect();

    Ok(Json(ListResultsResponse {
        results,
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }))
}
