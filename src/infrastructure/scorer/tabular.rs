//! Row-wise scorer for timeseries CSV datasets
//!
//! Every row of every `.csv` file under the dataset directory becomes one
//! sample. The score is a deterministic digest of the row's column widths
//! plus a small random perturbation, clamped to [0, 1].

use std::path::Path;

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;

use crate::domain::error::DomainError;
use crate::domain::scorer::{SampleResult, Scorer, ScorerParams, Verdict};

use super::{has_extension, round_score, sorted_files};

#[derive(Debug, Default)]
pub struct TabularScorer;

impl TabularScorer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scorer for TabularScorer {
    fn name(&self) -> &'static str {
        "dummy_timeseries"
    }

    async fn score(
        &self,
        dataset_dir: &Path,
        params: &ScorerParams,
    ) -> Result<Vec<SampleResult>, DomainError> {
        let threshold = params.threshold();
        let mut results = Vec::new();

        for path in sorted_files(dataset_dir).await? {
            if !has_extension(&path, &["csv"]) {
                continue;
            }

            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| DomainError::scorer(format!("Failed to read '{}': {}", file_name, e)))?;

            for (row_index, line) in content.lines().enumerate() {
                let columns: Vec<&str> = line.split(',').collect();
                let base = (columns.iter().map(|c| c.len()).sum::<usize>() % 100) as f64 / 100.0;
                let noise = rand::thread_rng().gen_range(-0.1..0.1);
                let score = round_score((base + noise).clamp(0.0, 1.0));
                let preview: Vec<&str> = columns.iter().take(5).copied().collect();

                results.push(SampleResult {
                    sample_key: format!("{}:row:{}", file_name, row_index),
                    score: Some(score),
                    verdict: Some(Verdict::from_score(score, threshold)),
                    output_path: Some(path.to_string_lossy().into_owned()),
                    detail: json!({
                        "row_index": row_index,
                        "preview": preview,
                        "source_type": "timeseries",
                    }),
                    summary: json!({
                        "rule": "dummy_timeseries_row_score",
                        "threshold": threshold,
                    }),
                });
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scores_every_csv_row() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("series.csv"), "ts,value\n1,10\n2,20\n").unwrap();

        let scorer = TabularScorer::new();
        let results = scorer
            .score(dir.path(), &ScorerParams::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].sample_key, "series.csv:row:0");
        assert_eq!(results[2].sample_key, "series.csv:row:2");

        for result in &results {
            let score = result.score.unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert_eq!(
                result.verdict.unwrap(),
                Verdict::from_score(score, 0.5),
                "verdict must match the thresholded score"
            );
            assert_eq!(result.detail["source_type"], json!("timeseries"));
            assert_eq!(result.summary["rule"], json!("dummy_timeseries_row_score"));
        }
    }

    #[tokio::test]
    async fn test_ignores_non_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a csv").unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();

        let scorer = TabularScorer::new();
        let results = scorer
            .score(dir.path(), &ScorerParams::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sample_key, "data.csv:row:0");
    }

    #[tokio::test]
    async fn test_files_scanned_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "y\n").unwrap();

        let scorer = TabularScorer::new();
        let results = scorer
            .score(dir.path(), &ScorerParams::default())
            .await
            .unwrap();

        assert_eq!(results[0].sample_key, "a.csv:row:0");
        assert_eq!(results[1].sample_key, "b.csv:row:0");
    }

    #[tokio::test]
    async fn test_custom_threshold_in_summary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b,c\n").unwrap();

        let scorer = TabularScorer::new();
        let params = ScorerParams::new(json!({"threshold": 0.9}));
        let results = scorer.score(dir.path(), &params).await.unwrap();

        assert_eq!(results[0].summary["threshold"], json!(0.9));
    }

    #[tokio::test]
    async fn test_empty_dataset_yields_no_samples() {
        let dir = tempfile::tempdir().unwrap();

        let scorer = TabularScorer::new();
        let results = scorer
            .score(dir.path(), &ScorerParams::default())
            .await
            .unwrap();

        assert!(results.is_empty());
    }
}
