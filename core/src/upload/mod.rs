//! Two-sink upload stage: one structured record to the analytics store and
//! one object per task-directory file to the blob store. The sinks are
//! independent; failure in one never blocks the other.

mod manifest;
mod record;
pub mod retry;
mod traits;

pub use manifest::{build_manifest, ManifestEntry};
pub use record::{RecordLoadError, UploadRecord};
pub use traits::{BlobSink, RecordSink};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::config::RetryConfig;
use crate::error::SinkError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordOutcome {
    Uploaded,
    /// `result.json` absent: warned and skipped, not fatal to the run.
    MissingFile,
    ParseFailed(String),
    Failed(String),
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilesOutcome {
    Ran(SinkReport),
    /// The walk itself failed (missing/unreadable task directory).
    Failed(String),
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    Completed,
    PartiallyFailed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub record: RecordOutcome,
    pub files: FilesOutcome,
    pub status: UploadStatus,
}

/// Where the run's artifacts live: the result JSON file and the task
/// directory whose full contents are bulk-uploaded.
#[derive(Debug, Clone)]
struct TaskLayout {
    result_file: PathBuf,
    task_dir: PathBuf,
}

impl TaskLayout {
    /// The extracted path may name the result file directly or the
    /// directory holding it. The path must still exist here; if the runner
    /// (or anyone else) removed it between phases, that is a reportable
    /// filesystem error, not silently skipped work.
    fn resolve(result_path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(result_path)?;
        if meta.is_file() {
            let task_dir = result_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(Self {
                result_file: result_path.to_path_buf(),
                task_dir,
            })
        } else {
            Ok(Self {
                result_file: result_path.join("result.json"),
                task_dir: result_path.to_path_buf(),
            })
        }
    }
}

pub struct UploadCoordinator {
    record_sink: Option<Arc<dyn RecordSink>>,
    blob_sink: Option<Arc<dyn BlobSink>>,
    retry: RetryConfig,
    concurrency: usize,
}

impl UploadCoordinator {
    pub fn new(
        record_sink: Option<Arc<dyn RecordSink>>,
        blob_sink: Option<Arc<dyn BlobSink>>,
        retry: RetryConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            record_sink,
            blob_sink,
            retry,
            concurrency: concurrency.max(1),
        }
    }

    /// Drive both uploads for the extracted result path. Always returns a
    /// report; per-item errors are aggregated, never propagated.
    pub async fn upload(&self, result_path: &Path) -> UploadReport {
        if self.record_sink.is_none() && self.blob_sink.is_none() {
            tracing::warn!("no sinks configured, skipping uploads");
            return UploadReport {
                record: RecordOutcome::Disabled,
                files: FilesOutcome::Disabled,
                status: UploadStatus::Skipped,
            };
        }

        let layout = match TaskLayout::resolve(result_path) {
            Ok(layout) => layout,
            Err(e) => {
                let msg = format!("result path unusable: {}: {e}", result_path.display());
                tracing::error!("{msg}");
                return UploadReport {
                    record: RecordOutcome::Failed(msg.clone()),
                    files: FilesOutcome::Failed(msg),
                    status: UploadStatus::PartiallyFailed,
                };
            }
        };

        let (record, files) =
            tokio::join!(self.upload_record(&layout), self.upload_files(&layout));

        let status = overall_status(&record, &files);
        UploadReport {
            record,
            files,
            status,
        }
    }

    async fn upload_record(&self, layout: &TaskLayout) -> RecordOutcome {
        let Some(sink) = self.record_sink.as_deref() else {
            return RecordOutcome::Disabled;
        };

        let record = match UploadRecord::load(&layout.result_file, &layout.task_dir) {
            Ok(record) => record,
            Err(RecordLoadError::Missing(path)) => {
                tracing::warn!("result file not found at {}", path.display());
                return RecordOutcome::MissingFile;
            }
            Err(e @ RecordLoadError::Parse(_)) => {
                tracing::error!("{e}");
                return RecordOutcome::ParseFailed(e.to_string());
            }
            Err(e) => {
                tracing::error!("{e}");
                return RecordOutcome::Failed(e.to_string());
            }
        };

        tracing::info!(
            sink = sink.name(),
            source = %record.source_path.display(),
            "uploading result record"
        );
        match retry::with_retry(&self.retry, "record.insert", || sink.insert(&record)).await {
            Ok(()) => RecordOutcome::Uploaded,
            Err(e) => {
                tracing::error!(sink = sink.name(), "record upload failed: {e}");
                RecordOutcome::Failed(e.to_string())
            }
        }
    }

    async fn upload_files(&self, layout: &TaskLayout) -> FilesOutcome {
        let Some(sink) = self.blob_sink.as_ref() else {
            return FilesOutcome::Disabled;
        };

        let entries = match build_manifest(&layout.task_dir) {
            Ok(entries) => entries,
            Err(e) => {
                let msg = format!(
                    "task directory walk failed: {}: {e}",
                    layout.task_dir.display()
                );
                tracing::error!("{msg}");
                return FilesOutcome::Failed(msg);
            }
        };

        if entries.is_empty() {
            tracing::warn!("no files found in task directory");
        }

        // Dispatch in manifest (key) order with a bounded number of
        // in-flight uploads; each file succeeds or fails on its own.
        let results: Vec<(String, Result<(), SinkError>)> = stream::iter(entries.iter().map(
            |entry| {
                let sink = Arc::clone(sink);
                let retry = &self.retry;
                async move {
                    let res =
                        retry::with_retry(retry, "blob.put", || sink.put_file(&entry.local, &entry.key))
                            .await;
                    (entry.key.clone(), res)
                }
            },
        ))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut report = SinkReport {
            attempted: results.len(),
            ..Default::default()
        };
        for (key, res) in results {
            match res {
                Ok(()) => {
                    tracing::info!(sink = sink.name(), key = %key, "uploaded");
                    report.succeeded += 1;
                }
                Err(e) => {
                    tracing::error!(sink = sink.name(), key = %key, "file upload failed: {e}");
                    report.failed += 1;
                }
            }
        }
        FilesOutcome::Ran(report)
    }
}

fn overall_status(record: &RecordOutcome, files: &FilesOutcome) -> UploadStatus {
    let record_failed = matches!(
        record,
        RecordOutcome::ParseFailed(_) | RecordOutcome::Failed(_)
    );
    let files_failed = match files {
        FilesOutcome::Ran(report) => report.failed > 0,
        FilesOutcome::Failed(_) => true,
        FilesOutcome::Disabled => false,
    };
    if record_failed || files_failed {
        UploadStatus::PartiallyFailed
    } else {
        UploadStatus::Completed
    }
}

impl UploadReport {
    pub fn succeeded(&self) -> bool {
        self.status != UploadStatus::PartiallyFailed
    }
}
