//! Validation entity
//!
//! A human judgment attached to a run + sample key pair. Append-only;
//! the executor never touches these rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;
use crate::domain::run::RunId;

entity_id!(
    /// Validated validation identifier: `val-{uuid}`
    ValidationId,
    "val-"
);

/// Human review of one scored sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub id: ValidationId,
    pub run_id: RunId,
    pub sample_key: String,
    /// Reviewer's own ok/ng call, free-form
    pub human_verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Validation {
    pub fn new(
        run_id: RunId,
        sample_key: impl Into<String>,
        human_verdict: impl Into<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: ValidationId::generate(),
            run_id,
            sample_key: sample_key.into(),
            human_verdict: human_verdict.into(),
            comment,
            created_at: Utc::now(),
        }
    }
}
