use std::path::Path;

use async_trait::async_trait;

use crate::error::SinkError;

use super::record::UploadRecord;

/// Structured-record destination (the analytics store). One insert per run.
#[async_trait]
pub trait RecordSink: Send + Sync {
    fn name(&self) -> &str;
    async fn insert(&self, record: &UploadRecord) -> Result<(), SinkError>;
}

/// Bulk file destination (the blob store). Re-uploading the same key must
/// overwrite the same object.
#[async_trait]
pub trait BlobSink: Send + Sync {
    fn name(&self) -> &str;
    async fn put_file(&self, local: &Path, key: &str) -> Result<(), SinkError>;
}
