//! Scorer capability - the pluggable scoring seam
//!
//! A [`Scorer`] turns a dataset directory into an ordered sequence of
//! [`SampleResult`]s. Implementations are stateless and perform no I/O
//! beyond reading the input directory. Directory scans must be
//! deterministic (lexicographic path order) so results are reproducible
//! for the same inputs and params.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Default verdict threshold when the run params carry none
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Input modality a scorer (and dataset/model) operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Vision,
    Timeseries,
    Mixed,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vision => write!(f, "vision"),
            Self::Timeseries => write!(f, "timeseries"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for Modality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vision" => Ok(Self::Vision),
            "timeseries" => Ok(Self::Timeseries),
            "mixed" => Ok(Self::Mixed),
            other => Err(DomainError::validation(format!(
                "Invalid modality '{}': expected vision, timeseries or mixed",
                other
            ))),
        }
    }
}

/// Derived ok/ng classification of a scored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ok,
    Ng,
}

impl Verdict {
    /// Threshold a score: `ok` iff `score >= threshold`, else `ng`
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Self::Ok
        } else {
            Self::Ng
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Ng => write!(f, "ng"),
        }
    }
}

/// Opaque run parameters passed verbatim to a scorer
#[derive(Debug, Clone, Default)]
pub struct ScorerParams(Value);

impl ScorerParams {
    pub fn new(params: Value) -> Self {
        Self(params)
    }

    /// The verdict threshold, defaulting to [`DEFAULT_THRESHOLD`].
    /// Accepts both JSON numbers and numeric strings.
    pub fn threshold(&self) -> f64 {
        match self.0.get("threshold") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_THRESHOLD),
            Some(Value::String(s)) => s.parse().unwrap_or(DEFAULT_THRESHOLD),
            _ => DEFAULT_THRESHOLD,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

/// One scored sample produced by a [`Scorer`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    /// Stable identifier of the scored sample, unique within the input set
    pub sample_key: String,

    /// Score in [0, 1] when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Verdict derived by thresholding the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,

    /// Reference to the originating input artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Opaque payload documenting how the score was derived
    pub detail: Value,

    /// The rule/threshold that produced the verdict
    pub summary: Value,
}

/// Polymorphic scoring capability, resolved per (backend, modality) pair
#[async_trait]
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Stable backend implementation name (for logging)
    fn name(&self) -> &'static str;

    /// Score every sample under `dataset_dir`
    async fn score(
        &self,
        dataset_dir: &Path,
        params: &ScorerParams,
    ) -> Result<Vec<SampleResult>, DomainError>;
}
