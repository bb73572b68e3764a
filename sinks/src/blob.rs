use std::path::Path;

use async_trait::async_trait;

use benchrelay_core::config::BlobConfig;
use benchrelay_core::error::SinkError;
use benchrelay_core::upload::BlobSink;

use crate::{check_status, maybe_bearer, transport_error};

/// Puts one object per file into the blob store. Keys are carried in the
/// `name` query parameter; re-uploading the same key overwrites the object.
#[derive(Clone)]
pub struct BlobHttpSink {
    base_url: String,
    api_key: String,
    bucket: String,
    http: reqwest::Client,
}

impl BlobHttpSink {
    pub fn new(cfg: &BlobConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            bucket: cfg.bucket.clone(),
            http,
        })
    }

    fn objects_url(&self) -> String {
        format!("{}/v1/buckets/{}/objects", self.base_url, self.bucket)
    }
}

#[async_trait]
impl BlobSink for BlobHttpSink {
    fn name(&self) -> &str {
        "blob"
    }

    async fn put_file(&self, local: &Path, key: &str) -> Result<(), SinkError> {
        let body = tokio::fs::read(local).await?;
        let url = self.objects_url();
        tracing::debug!(url = %url, key = %key, bytes = body.len(), "putting object");

        let req = self
            .http
            .put(&url)
            .query(&[("name", key)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body);
        let resp = maybe_bearer(req, &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(e, &url))?;
        check_status(resp, &url).await
    }
}
