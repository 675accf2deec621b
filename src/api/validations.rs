//! Human validation endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::run::RunId;
use crate::domain::validation::Validation;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateValidationRequest {
    pub run_id: String,
    pub sample_key: String,
    pub human_verdict: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    pub id: String,
    pub run_id: String,
    pub sample_key: String,
    pub human_verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<&Validation> for ValidationResponse {
    fn from(validation: &Validation) -> Self {
        Self {
            id: validation.id.to_string(),
            run_id: validation.run_id.to_string(),
            sample_key: validation.sample_key.clone(),
            human_verdict: validation.human_verdict.clone(),
            comment: validation.comment.clone(),
            created_at: validation.created_at.to_rfc3339(),
        }
    }
}

/// POST /api/validations
pub async fn create_validation(
    State(state): State<AppState>,
    Json(request): Json<CreateValidationRequest>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let run_id = RunId::new(request.run_id)?;

    if state.runs.get(&run_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Run '{}'", run_id)));
    }

    if request.sample_key.trim().is_empty() {
        return Err(
            ApiError::bad_request("sample_key must not be empty").with_param("sample_key"),
        );
    }
    if request.human_verdict.trim().is_empty() {
        return Err(
            ApiError::bad_request("human_verdict must not be empty").with_param("human_verdict"),
        );
    }

    debug!(run_id = %run_id, sample_key = %request.sample_key, "Recording validation");

    let validation = state
        .validations
        .create(Validation::new(
            run_id,
            request.sample_key,
            request.human_verdict,
            request.comment,
        ))
        .await?;

    Ok(Json(ValidationResponse::from(&validation)))
}

/// GET /api/inference-runs/:run_id/validations
pub async fn list_validations(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<Vec<ValidationResponse>>, ApiError> {
    let run_id = RunId::new(run_id)?;

    if state.runs.get(&run_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Run '{}'", run_id)));
    }

    let validations = state.validations.list_by_run(&run_id).await?;

    Ok(Json(
        validations.iter().map(ValidationResponse::from).collect(),
    ))
}
