#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use benchrelay_cli::app::{run_pipeline, Sinks};
use benchrelay_cli::cli::Args;
use benchrelay_core::config::AppConfig;
use benchrelay_core::error::SinkError;
use benchrelay_core::upload::{BlobSink, RecordSink, UploadRecord};

// Lives in its own test binary: the stub delivers a real SIGINT to this
// process, which must not race other tests' runner loops.

#[derive(Default)]
struct CapturingRecordSink {
    inserted: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl RecordSink for CapturingRecordSink {
    fn name(&self) -> &str {
        "capture-record"
    }

    async fn insert(&self, record: &UploadRecord) -> Result<(), SinkError> {
        self.inserted.lock().unwrap().push(record.payload.clone());
        Ok(())
    }
}

#[derive(Default)]
struct CapturingBlobSink {
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobSink for CapturingBlobSink {
    fn name(&self) -> &str {
        "capture-blob"
    }

    async fn put_file(&self, _local: &Path, key: &str) -> Result<(), SinkError> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("stub-runner.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn sigint_kills_runner_and_skips_extraction_and_uploads() {
    let tmp = tempfile::tempdir().unwrap();
    let task = tmp.path().join("job42");
    std::fs::create_dir_all(&task).unwrap();
    std::fs::write(task.join("result.json"), r#"{"score": 0.87}"#).unwrap();

    // The marker is already printed when the interrupt lands, but an
    // interrupted run must not proceed to extraction or uploads.
    let stub = write_stub(
        tmp.path(),
        &format!(
            "echo \"Results written to {}\"\nsleep 1\nkill -INT $PPID\nexec sleep 30",
            task.display()
        ),
    );

    let args = Args {
        runner: Some(stub.to_string_lossy().to_string()),
        ..Args::default()
    };

    let record = Arc::new(CapturingRecordSink::default());
    let blob = Arc::new(CapturingBlobSink::default());
    let exit = run_pipeline(
        &AppConfig::default(),
        &args,
        Sinks {
            record: Some(record.clone()),
            blob: Some(blob.clone()),
        },
    )
    .await
    .unwrap();

    assert_eq!(exit, 130);
    assert!(record.inserted.lock().unwrap().is_empty());
    assert!(blob.keys.lock().unwrap().is_empty());
}
