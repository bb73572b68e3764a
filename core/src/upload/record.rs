use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Parsed `result.json` payload plus provenance. Written once per run,
/// never updated in place.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub payload: serde_json::Value,
    pub source_path: PathBuf,
    pub task_dir_name: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum RecordLoadError {
    #[error("result file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read result file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed result json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl UploadRecord {
    pub fn load(result_file: &Path, task_dir: &Path) -> Result<Self, RecordLoadError> {
        if !result_file.exists() {
            return Err(RecordLoadError::Missing(result_file.to_path_buf()));
        }
        let raw = std::fs::read_to_string(result_file)?;
        let payload: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(Self {
            payload,
            source_path: result_file.to_path_buf(),
            task_dir_name: task_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_payload_and_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("result.json");
        std::fs::write(&file, r#"{"score": 0.87}"#).unwrap();

        let record = UploadRecord::load(&file, dir.path()).unwrap();
        assert_eq!(record.payload["score"], 0.87);
        assert_eq!(record.source_path, file);
        assert_eq!(
            record.task_dir_name,
            dir.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn missing_file_is_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadRecord::load(&dir.path().join("result.json"), dir.path()).unwrap_err();
        assert!(matches!(err, RecordLoadError::Missing(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("result.json");
        std::fs::write(&file, "{not json").unwrap();
        let err = UploadRecord::load(&file, dir.path()).unwrap_err();
        assert!(matches!(err, RecordLoadError::Parse(_)));
    }
}
