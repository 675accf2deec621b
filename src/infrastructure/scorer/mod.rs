//! Scorer backends and the (backend, modality) registry

mod registry;
mod tabular;
mod vision;

pub use registry::ScorerRegistry;
pub use tabular::TabularScorer;
pub use vision::VisionScorer;

use std::path::{Path, PathBuf};

use crate::domain::error::DomainError;

/// List the files directly under `dir` in lexicographic path order.
///
/// Deterministic ordering keeps sample sequences stable across runs over
/// the same dataset.
pub(crate) async fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DomainError::scorer(format!("Failed to read dataset dir: {}", e)))?;

    let mut files = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::scorer(format!("Failed to read dataset entry: {}", e)))?
    {
        let path = entry.path();

        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// True when `path` carries one of `extensions` (case-insensitive)
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Round a score to four decimal places
pub(crate) fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
