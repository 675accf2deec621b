//! Dataset and file upload endpoints

use axum::extract::{Multipart, Path, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::dataset::{Dataset, DatasetFile, DatasetId};
use crate::domain::project::ProjectId;
use crate::domain::scorer::Modality;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub modality: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResponse {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub modality: Modality,
    pub created_at: String,
}

impl From<&Dataset> for DatasetResponse {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: dataset.id.to_string(),
            project_id: dataset.project_id.to_string(),
            name: dataset.name.clone(),
            modality: dataset.modality,
            created_at: dataset.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetFileResponse {
    pub id: String,
    pub dataset_id: String,
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_url: Option<String>,
}

impl DatasetFileResponse {
    fn new(file: &DatasetFile, static_url: Option<String>) -> Self {
        Self {
            id: file.id.to_string(),
            dataset_id: file.dataset_id.to_string(),
            file_name: file.file_name.clone(),
            file_path: file.file_path.clone(),
            media_type: file.media_type.clone(),
            size_bytes: file.size_bytes,
            metadata: file.metadata.clone(),
            created_at: file.created_at.to_rfc3339(),
            static_url,
        }
    }
}

/// GET /api/projects/:project_id/datasets
pub async fn list_datasets(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<DatasetResponse>>, ApiError> {
    let project_id = ProjectId::new(project_id)?;
    let datasets = state.datasets.list_by_project(&project_id).await?;

    Ok(Json(datasets.iter().map(DatasetResponse::from).collect()))
}

/// POST /api/projects/:project_id/datasets
pub async fn create_dataset(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<CreateDatasetRequest>,
) -> Result<Json<DatasetResponse>, ApiError> {
    let project_id = ProjectId::new(project_id)?;

    if !state.projects.exists(&project_id).await? {
        return Err(ApiError::not_found(format!("Project '{}'", project_id)));
    }

    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Dataset name must not be empty").with_param("name"));
    }

    let modality: Modality = request
        .modality
        .parse()
        .map_err(|e: crate::domain::DomainError| ApiError::from(e).with_param("modality"))?;

    debug!(project_id = %project_id, name = %request.name, "Creating dataset");

    let dataset = state
        .datasets
        .create(Dataset::new(project_id, request.name, modality))
        .await?;

    Ok(Json(DatasetResponse::from(&dataset)))
}

/// GET /api/datasets/:dataset_id/files
pub async fn list_files(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<Vec<DatasetFileResponse>>, ApiError> {
    let dataset_id = DatasetId::new(dataset_id)?;

    if !state.datasets.exists(&dataset_id).await? {
        return Err(ApiError::not_found(format!("Dataset '{}'", dataset_id)));
    }

    let files = state.datasets.list_files(&dataset_id).await?;
    let responses = files
        .iter()
        .map(|file| DatasetFileResponse::new(file, state.artifacts.static_url(&file.file_path)))
        .collect();

    Ok(Json(responses))
}

/// POST /api/datasets/:dataset_id/files (multipart)
pub async fn upload_files(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Vec<DatasetFileResponse>>, ApiError> {
    let dataset_id = DatasetId::new(dataset_id)?;

    let dataset = state
        .datasets
        .get(&dataset_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Dataset '{}'", dataset_id)))?;

    let mut responses = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload.bin".to_string());
        let content_type = field.content_type().map(str::to_string);

        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let file = state
            .ingest
            .ingest_file(&dataset, &file_name, content_type, &contents)
            .await?;

        let static_url = state.ingest.static_url(&file);
        responses.push(DatasetFileResponse::new(&file, static_url));
    }

    if responses.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    info!(dataset_id = %dataset_id, count = responses.len(), "Uploaded dataset files");

    Ok(Json(responses))
}
