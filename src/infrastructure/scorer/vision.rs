//! Per-image scorer for vision datasets
//!
//! Each image file under the dataset directory becomes one sample with a
//! random confidence score and a synthetic bounding box.

use std::path::Path;

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;

use crate::domain::error::DomainError;
use crate::domain::scorer::{SampleResult, Scorer, ScorerParams, Verdict};

use super::{has_extension, round_score, sorted_files};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Default)]
pub struct VisionScorer;

impl VisionScorer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scorer for VisionScorer {
    fn name(&self) -> &'static str {
        "dummy_vision"
    }

    async fn score(
        &self,
        dataset_dir: &Path,
        params: &ScorerParams,
    ) -> Result<Vec<SampleResult>, DomainError> {
        let threshold = params.threshold();
        let mut results = Vec::new();

        for path in sorted_files(dataset_dir).await? {
            if !has_extension(&path, IMAGE_EXTENSIONS) {
                continue;
            }

            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            let (score, bbox) = {
                let mut rng = rand::thread_rng();
                let score = round_score(rng.gen_range(0.2..0.98));
                let bbox = json!({
                    "x": rng.gen_range(0..=100),
                    "y": rng.gen_range(0..=100),
                    "w": rng.gen_range(20..=120),
                    "h": rng.gen_range(20..=120),
                });

                (score, bbox)
            };

            results.push(SampleResult {
                sample_key: file_name,
                score: Some(score),
                verdict: Some(Verdict::from_score(score, threshold)),
                output_path: Some(path.to_string_lossy().into_owned()),
                detail: json!({
                    "bbox": bbox,
                    "source_type": "image",
                }),
                summary: json!({
                    "rule": "dummy_vision_threshold",
                    "threshold": threshold,
                }),
            });
        }

        Ok(results)
    }
}
