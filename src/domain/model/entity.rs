//! Model entity
//!
//! A model is catalog metadata only: it names the scoring backend and
//! modality the scorer registry resolves at execution time. There is no
//! model weight handling here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;
use crate::domain::scorer::Modality;

entity_id!(
    /// Validated model identifier: `mdl-{uuid}`
    ModelId,
    "mdl-"
);

/// Registered inference model backed by a scoring adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    /// Unique display name
    pub name: String,
    pub modality: Modality,
    /// Adapter key, e.g. "dummy"
    pub backend: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        modality: Modality,
        backend: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: ModelId::generate(),
            name: name.into(),
            modality,
            backend: backend.into(),
            version: version.into(),
            created_at: Utc::now(),
        }
    }
}
