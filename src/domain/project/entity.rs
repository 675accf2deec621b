//! Project entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;

entity_id!(
    /// Validated project identifier: `proj-{uuid}`
    ProjectId,
    "proj-"
);

/// A project groups datasets and inference runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new("defect-inspection", Some("camera line A".to_string()));
        assert!(project.id.as_str().starts_with("proj-"));
        assert_eq!(project.name, "defect-inspection");
        assert_eq!(project.description.as_deref(), Some("camera line A"));
    }

    #[test]
    fn test_project_serialization_skips_empty_description() {
        let project = Project::new("p", None);
        let json = serde_json::to_string(&project).unwrap();
        assert!(!json.contains("description"));
    }
}
