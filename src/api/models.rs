//! Model catalog endpoints

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::model::Model;
use crate::domain::scorer::Modality;

#[derive(Debug, Clone, Deserialize)]
pub struct ListModelsQuery {
    #[serde(default)]
    pub modality: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelResponse {
    pub id: String,
    pub name: String,
    pub modality: Modality,
    pub backend: String,
    pub version: String,
    pub created_at: String,
}

impl From<&Model> for ModelResponse {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name.clone(),
            modality: model.modality,
            backend: model.backend.clone(),
            version: model.version.clone(),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/models?modality=
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> Result<Json<Vec<ModelResponse>>, ApiError> {
    let modality = query
        .modality
        .as_deref()
        .map(str::parse::<Modality>)
        .transpose()
        .map_err(|e: crate::domain::DomainError| ApiError::from(e).with_param("modality"))?;

    let models = state.models.list(modality).await?;

    Ok(Json(models.iter().map(ModelResponse::from).collect()))
}
