mod load;
mod types;

pub use load::{data_dir, load_default};
pub use types::{
    AnalyticsConfig, AppConfig, BlobConfig, LoggingConfig, RetryConfig, RunnerConfig,
    UploadConfig,
};
