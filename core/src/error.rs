use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("launch failed: {0}")]
    Launch(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("wait failed: {0}")]
    Wait(#[source] std::io::Error),
}

/// Failure of a single network call against one sink. Retryability drives
/// the bounded-backoff loop in `upload::retry`.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink rejected request: status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl SinkError {
    /// Transient failures worth retrying: transport problems, throttling,
    /// and server-side errors. Client errors (4xx) are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            SinkError::Io(_) => false,
            SinkError::Status { status, .. } => *status == 429 || *status >= 500,
            SinkError::Transport(_) => true,
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("runner failed: {0}")]
    Runner(#[from] RunnerError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
