use async_trait::async_trait;
use serde_json::{json, Value};

use benchrelay_core::config::AnalyticsConfig;
use benchrelay_core::error::SinkError;
use benchrelay_core::upload::{RecordSink, UploadRecord};

use crate::{check_status, maybe_bearer, transport_error};

/// Inserts one row per run into the analytics store's table API.
#[derive(Clone)]
pub struct AnalyticsHttpSink {
    base_url: String,
    api_key: String,
    dataset: String,
    table: String,
    http: reqwest::Client,
}

impl AnalyticsHttpSink {
    pub fn new(cfg: &AnalyticsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            dataset: cfg.dataset.clone(),
            table: cfg.table.clone(),
            http,
        })
    }

    fn rows_url(&self) -> String {
        format!(
            "{}/v1/datasets/{}/tables/{}/rows",
            self.base_url, self.dataset, self.table
        )
    }
}

/// Flatten the nested result payload into one row. Known scalar fields are
/// lifted as-is; the nested `stats` object is re-serialized as a JSON string
/// column; provenance fields are appended.
fn flatten_row(record: &UploadRecord) -> Value {
    let payload = &record.payload;
    let stats = match payload.get("stats") {
        Some(Value::Null) | None => Value::Null,
        Some(v) => Value::String(v.to_string()),
    };
    json!({
        "id": payload.get("id").cloned().unwrap_or(Value::Null),
        "started_at": payload.get("started_at").cloned().unwrap_or(Value::Null),
        "finished_at": payload.get("finished_at").cloned().unwrap_or(Value::Null),
        "n_total_trials": payload.get("n_total_trials").cloned().unwrap_or(Value::Null),
        "stats": stats,
        "task_dir_name": record.task_dir_name,
        "uploaded_at": record.uploaded_at.to_rfc3339(),
    })
}

#[async_trait]
impl RecordSink for AnalyticsHttpSink {
    fn name(&self) -> &str {
        "analytics"
    }

    async fn insert(&self, record: &UploadRecord) -> Result<(), SinkError> {
        let url = self.rows_url();
        let row = flatten_row(record);
        tracing::debug!(url = %url, task_dir = %record.task_dir_name, "inserting result row");

        let req = self.http.post(&url).json(&json!({ "rows": [row] }));
        let resp = maybe_bearer(req, &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(e, &url))?;
        check_status(resp, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn record(payload: Value) -> UploadRecord {
        UploadRecord {
            payload,
            source_path: PathBuf::from("/tmp/job42/result.json"),
            task_dir_name: "job42".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    fn cfg(base_url: String) -> AnalyticsConfig {
        AnalyticsConfig {
            base_url,
            api_key: "sekrit".to_string(),
            ..AnalyticsConfig::default()
        }
    }

    #[test]
    fn flattens_known_fields_and_stringifies_stats() {
        let row = flatten_row(&record(serde_json::json!({
            "id": "run-1",
            "n_total_trials": 12,
            "stats": {"score": 0.87},
        })));
        assert_eq!(row["id"], "run-1");
        assert_eq!(row["n_total_trials"], 12);
        assert_eq!(row["started_at"], Value::Null);
        assert_eq!(row["task_dir_name"], "job42");
        let stats: Value = serde_json::from_str(row["stats"].as_str().unwrap()).unwrap();
        assert_eq!(stats["score"], 0.87);
    }

    #[tokio::test]
    async fn posts_one_insert_with_bearer_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/datasets/bench_results/tables/runs/rows")
            .match_header("authorization", "Bearer sekrit")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "rows": [{"task_dir_name": "job42"}]
            })))
            .with_status(200)
            .create_async()
            .await;

        let sink = AnalyticsHttpSink::new(&cfg(server.url())).unwrap();
        sink.insert(&record(serde_json::json!({"score": 0.87})))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/datasets/bench_results/tables/runs/rows")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let sink = AnalyticsHttpSink::new(&cfg(server.url())).unwrap();
        let err = sink
            .insert(&record(serde_json::json!({})))
            .await
            .unwrap_err();
        match err {
            SinkError::Status { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("overloaded"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(SinkError::Status {
            status: 503,
            message: String::new()
        }
        .is_retryable());
    }
}
