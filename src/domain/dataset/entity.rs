//! Dataset and dataset file entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::id::entity_id;
use crate::domain::project::ProjectId;
use crate::domain::scorer::Modality;

entity_id!(
    /// Validated dataset identifier: `ds-{uuid}`
    DatasetId,
    "ds-"
);

entity_id!(
    /// Validated dataset file identifier: `dsf-{uuid}`
    DatasetFileId,
    "dsf-"
);

/// A labeled collection of input artifacts belonging to one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub project_id: ProjectId,
    pub name: String,
    pub modality: Modality,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(project_id: ProjectId, name: impl Into<String>, modality: Modality) -> Self {
        Self {
            id: DatasetId::generate(),
            project_id,
            name: name.into(),
            modality,
            created_at: Utc::now(),
        }
    }
}

/// One uploaded input artifact of a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub id: DatasetFileId,
    pub dataset_id: DatasetId,
    pub file_name: String,
    /// Stored path under the storage root
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub size_bytes: u64,
    /// Extracted metadata (image kind, CSV row/column counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl DatasetFile {
    pub fn new(
        dataset_id: DatasetId,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        media_type: Option<String>,
        size_bytes: u64,
        metadata: Option<Value>,
    ) -> Self {
        Self {
            id: DatasetFileId::generate(),
            dataset_id,
            file_name: file_name.into(),
            file_path: file_path.into(),
            media_type,
            size_bytes,
            metadata,
            created_at: Utc::now(),
        }
    }
}
