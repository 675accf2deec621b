//! Dataset file ingestion
//!
//! Persists uploaded bytes under the dataset's raw directory and records
//! a file row with lightweight extracted metadata (image kind, CSV
//! row/column counts).

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use crate::domain::dataset::{Dataset, DatasetFile, DatasetRepository};
use crate::domain::error::DomainError;
use crate::infrastructure::artifact::ArtifactStore;

#[derive(Debug)]
pub struct IngestService {
    datasets: Arc<dyn DatasetRepository>,
    artifacts: ArtifactStore,
}

impl IngestService {
    pub fn new(datasets: Arc<dyn DatasetRepository>, artifacts: ArtifactStore) -> Self {
        Self { datasets, artifacts }
    }

    /// Store one uploaded file and record it on the dataset
    #[instrument(skip(self, dataset, contents), fields(dataset_id = %dataset.id))]
    pub async fn ingest_file(
        &self,
        dataset: &Dataset,
        file_name: &str,
        content_type: Option<String>,
        contents: &[u8],
    ) -> Result<DatasetFile, DomainError> {
        let destination = self
            .artifacts
            .save_dataset_file(&dataset.project_id, &dataset.id, file_name, contents)
            .await?;

        let stored_name = destination
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name)
            .to_string();

        let media_type = content_type.or_else(|| {
            mime_guess::from_path(&stored_name)
                .first()
                .map(|mime| mime.to_string())
        });

        let metadata = extract_metadata(&stored_name, contents);

        let file = DatasetFile::new(
            dataset.id.clone(),
            stored_name,
            destination.to_string_lossy().into_owned(),
            media_type,
            contents.len() as u64,
            metadata,
        );

        let file = self.datasets.add_file(file).await?;
        info!(file_id = %file.id, file_name = %file.file_name, "Ingested dataset file");

        Ok(file)
    }

    pub fn static_url(&self, file: &DatasetFile) -> Option<String> {
        self.artifacts.static_url(&file.file_path)
    }
}

/// Best-effort metadata extraction; `None` when nothing was recognized
fn extract_metadata(file_name: &str, contents: &[u8]) -> Option<Value> {
    let mut metadata = Map::new();

    if let Some(kind) = detect_image_kind(contents) {
        metadata.insert("image_type".to_string(), json!(kind));
    }

    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        if let Ok(text) = std::str::from_utf8(contents) {
            let rows: Vec<&str> = text.lines().collect();
            let cols = rows
                .iter()
                .map(|row| row.split(',').count())
                .max()
                .unwrap_or(0);

            metadata.insert("row".to_string(), json!(rows.len()));
            metadata.insert("col".to_string(), json!(cols));
        }
    }

    if metadata.is_empty() {
        None
    } else {
        Some(Value::Object(metadata))
    }
}

/// Recognize common image formats by their magic bytes
fn detect_image_kind(contents: &[u8]) -> Option<&'static str> {
    if contents.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if contents.starts_with(b"\xff\xd8\xff") {
        Some("jpeg")
    } else if contents.starts_with(b"BM") {
        Some("bmp")
    } else if contents.starts_with(b"GIF87a") || contents.starts_with(b"GIF89a") {
        Some("gif")
    } else {
        None
    }
}
