use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "benchrelay_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Name of the runner binary, used for `.venv/bin` and PATH lookup when
    /// no explicit path is given.
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Explicit path to the runner executable. Overridden by the `--runner`
    /// flag and the `BENCHRELAY_RUNNER_PATH` env var.
    #[serde(default)]
    pub path: Option<String>,

    /// Default output directory injected into `run` / `jobs start`
    /// invocations that carry no output flag of their own.
    #[serde(default)]
    pub default_output_dir: Option<String>,

    /// Capacity of the channel carrying tee'd output lines from the io
    /// pumps back to the run loop.
    #[serde(default = "default_line_channel_capacity")]
    pub line_channel_capacity: usize,
}

fn default_binary_name() -> String {
    "bench-runner".to_string()
}

fn default_line_channel_capacity() -> usize {
    1024
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary_name: default_binary_name(),
            path: None,
            default_output_dir: None,
            line_channel_capacity: default_line_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of in-flight blob uploads.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub blob: BlobConfig,
}

fn default_concurrency() -> usize {
    4
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry: RetryConfig::default(),
            analytics: AnalyticsConfig::default(),
            blob: BlobConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_sink_enabled")]
    pub enabled: bool,

    /// Base URL of the analytics store, e.g. "https://analytics.internal".
    /// Empty means the sink is not configured.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_dataset")]
    pub dataset: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_sink_enabled() -> bool {
    true
}

fn default_dataset() -> String {
    "bench_results".to_string()
}

fn default_table() -> String {
    "runs".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_sink_enabled(),
            base_url: String::new(),
            api_key: String::new(),
            dataset: default_dataset(),
            table: default_table(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(default = "default_sink_enabled")]
    pub enabled: bool,

    /// Base URL of the blob store. Empty means the sink is not configured.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_bucket() -> String {
    "bench-results".to_string()
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            enabled: default_sink_enabled(),
            base_url: String::new(),
            api_key: String::new(),
            bucket: default_bucket(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert!(cfg.logging.enabled);
        assert_eq!(cfg.runner.binary_name, "bench-runner");
        assert_eq!(cfg.upload.concurrency, 4);
        assert_eq!(cfg.upload.retry.max_attempts, 3);
        assert!(cfg.upload.analytics.base_url.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [runner]
            binary_name = "harness"

            [upload.analytics]
            base_url = "http://localhost:9090"
            dataset = "d1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.runner.binary_name, "harness");
        assert_eq!(cfg.upload.analytics.dataset, "d1");
        assert_eq!(cfg.upload.analytics.table, "runs");
        assert_eq!(cfg.upload.blob.bucket, "bench-results");
    }
}
