//! Filesystem layout for uploaded datasets and run outputs
//!
//! All artifacts live under a single storage root:
//!
//! ```text
//! <root>/<project_id>/datasets/<dataset_id>/raw/<file_name>
//! <root>/<project_id>/runs/<run_id>/outputs/<manifest>.json
//! ```
//!
//! The root is also served verbatim under the `/static` route, so any
//! path beneath it maps to a browsable URL.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::dataset::DatasetId;
use crate::domain::error::DomainError;
use crate::domain::project::ProjectId;
use crate::domain::run::RunId;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a dataset's uploaded files
    pub fn dataset_raw_dir(&self, project_id: &ProjectId, dataset_id: &DatasetId) -> PathBuf {
        self.root
            .join(project_id.as_str())
            .join("datasets")
            .join(dataset_id.as_str())
            .join("raw")
    }

    /// Directory holding a run's output manifests
    pub fn run_output_dir(&self, project_id: &ProjectId, run_id: &RunId) -> PathBuf {
        self.root
            .join(project_id.as_str())
            .join("runs")
            .join(run_id.as_str())
            .join("outputs")
    }

    /// Persist one uploaded file under the dataset's raw directory.
    ///
    /// Only the final path component of `file_name` is used, so uploads
    /// cannot escape the dataset directory.
    pub async fn save_dataset_file(
        &self,
        project_id: &ProjectId,
        dataset_id: &DatasetId,
        file_name: &str,
        contents: &[u8],
    ) -> Result<PathBuf, DomainError> {
        let raw_dir = self.dataset_raw_dir(project_id, dataset_id);

        tokio::fs::create_dir_all(&raw_dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create dataset dir: {}", e)))?;

        let safe_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");

        let destination = raw_dir.join(safe_name);

        tokio::fs::write(&destination, contents)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write '{}': {}", safe_name, e)))?;

        Ok(destination)
    }

    /// Create (if needed) and return the run's output directory
    pub async fn ensure_run_output_dir(
        &self,
        project_id: &ProjectId,
        run_id: &RunId,
    ) -> Result<PathBuf, DomainError> {
        let output_dir = self.run_output_dir(project_id, run_id);

        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create output dir: {}", e)))?;

        Ok(output_dir)
    }

    /// Write one per-sample manifest into `output_dir`.
    ///
    /// The manifest file name is derived from the sample key with path
    /// separators flattened, so keys like `sub/frame.png` stay within
    /// the output directory.
    pub async fn write_manifest<T: Serialize>(
        &self,
        output_dir: &Path,
        sample_key: &str,
        payload: &T,
    ) -> Result<PathBuf, DomainError> {
        let file_name = format!("{}.json", sample_key.replace('/', "_"));
        let manifest_path = output_dir.join(&file_name);

        let body = serde_json::to_string(payload)
            .map_err(|e| DomainError::storage(format!("Failed to encode manifest: {}", e)))?;

        tokio::fs::write(&manifest_path, body)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write manifest: {}", e)))?;

        Ok(manifest_path)
    }

    /// Map a stored artifact path to its `/static` URL, when it lives
    /// under the storage root
    pub fn static_url(&self, path: &str) -> Option<String> {
        let relative = Path::new(path).strip_prefix(&self.root).ok()?;

        let mut url = String::from("/static");

        for component in relative.components() {
            url.push('/');
            url.push_str(component.as_os_str().to_str()?);
        }

        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids() -> (ProjectId, DatasetId, RunId) {
        (ProjectId::generate(), DatasetId::generate(), RunId::generate())
    }

    #[tokio::test]
    async fn test_save_dataset_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (project_id, dataset_id, _) = ids();

        let path = store
            .save_dataset_file(&project_id, &dataset_id, "frame.png", b"fake")
            .await
            .unwrap();

        assert!(path.ends_with("raw/frame.png"));
        assert!(path.starts_with(dir.path().join(project_id.as_str())));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake");
    }

    #[tokio::test]
    async fn test_save_dataset_file_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (project_id, dataset_id, _) = ids();

        let path = store
            .save_dataset_file(&project_id, &dataset_id, "../../escape.bin", b"x")
            .await
            .unwrap();

        assert!(path.starts_with(store.dataset_raw_dir(&project_id, &dataset_id)));
        assert!(path.ends_with("escape.bin"));
    }

    #[tokio::test]
    async fn test_manifest_flattens_sample_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (project_id, _, run_id) = ids();

        let output_dir = store.ensure_run_output_dir(&project_id, &run_id).await.unwrap();
        let path = store
            .write_manifest(&output_dir, "sub/frame.png", &json!({"score": 0.5}))
            .await
            .unwrap();

        assert!(path.ends_with("sub_frame.png.json"));
        assert_eq!(path.parent().unwrap(), output_dir);
    }

    #[test]
    fn test_static_url_for_stored_paths() {
        let store = ArtifactStore::new("storage");

        assert_eq!(
            store.static_url("storage/proj-1/datasets/ds-1/raw/a.png"),
            Some("/static/proj-1/datasets/ds-1/raw/a.png".to_string())
        );
        assert_eq!(store.static_url("/etc/passwd"), None);
    }
}
