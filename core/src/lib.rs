//! Orchestration core for benchrelay.
//!
//! Runs an external benchmark runner, tees its output, recovers the reported
//! result path, and relays the results to the configured sinks. HTTP sink
//! implementations live in `benchrelay-sinks`; this crate only defines the
//! trait seams they plug into.

pub mod config;
pub mod error;
pub mod extract;
pub mod listing;
pub mod runner;
pub mod upload;

pub use config::{load_default, AppConfig, LoggingConfig, RunnerConfig, UploadConfig};
pub use error::{CliError, RunnerError, SinkError};
pub use extract::extract_result_path;
pub use listing::{list_dir, DirEntryInfo, EntryKind};
pub use runner::{run, LaunchSpec, ProcessOutcome, Termination};
pub use upload::{
    BlobSink, FilesOutcome, RecordOutcome, RecordSink, SinkReport, UploadCoordinator,
    UploadRecord, UploadReport, UploadStatus,
};
