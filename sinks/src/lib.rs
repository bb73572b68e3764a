//! HTTP implementations of the benchrelay sink traits.
//!
//! `AnalyticsHttpSink` inserts one flattened record per run into the
//! analytics store; `BlobHttpSink` puts one object per task-directory file
//! into the blob store. Both map transport and status failures into
//! `SinkError` so the coordinator's retry policy can classify them.

mod analytics;
mod blob;

pub use analytics::AnalyticsHttpSink;
pub use blob::BlobHttpSink;

use benchrelay_core::error::SinkError;

const BODY_PREVIEW_LIMIT: usize = 512;

pub(crate) fn transport_error(err: reqwest::Error, url: &str) -> SinkError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_request() {
        "request"
    } else if err.is_body() {
        "body"
    } else {
        "unknown"
    };
    SinkError::Transport(format!("{kind}: {err} (url={url})"))
}

pub(crate) async fn check_status(resp: reqwest::Response, url: &str) -> Result<(), SinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
    Err(SinkError::Status {
        status: status.as_u16(),
        message: format!("{preview} (url={url})"),
    })
}

pub(crate) fn maybe_bearer(
    req: reqwest::RequestBuilder,
    api_key: &str,
) -> reqwest::RequestBuilder {
    if api_key.trim().is_empty() {
        req
    } else {
        req.bearer_auth(api_key)
    }
}
