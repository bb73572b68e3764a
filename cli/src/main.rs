use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use benchrelay_cli::{app, cli};
use benchrelay_core::config::{self, AppConfig, LoggingConfig};
use benchrelay_core::error::{CliError, RunnerError};
use benchrelay_sinks::{AnalyticsHttpSink, BlobHttpSink};

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = config::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    let sinks = build_sinks(&cfg, args.no_upload)?;
    app::run_pipeline(&cfg, &args, sinks).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: runner launch / IO error
    // 31: uploads failed after a clean run (set by the pipeline)
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Runner(re) => match re {
            RunnerError::Launch(_) => 20,
            RunnerError::StreamIo { .. } => 20,
            RunnerError::Wait(_) => 20,
        },
        CliError::Io(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

fn build_sinks(cfg: &AppConfig, no_upload: bool) -> Result<app::Sinks, CliError> {
    if no_upload {
        return Ok(app::Sinks {
            record: None,
            blob: None,
        });
    }

    let record: Option<Arc<dyn benchrelay_core::upload::RecordSink>> =
        if cfg.upload.analytics.enabled && !cfg.upload.analytics.base_url.is_empty() {
            let sink = AnalyticsHttpSink::new(&cfg.upload.analytics)
                .map_err(|e| CliError::Config(format!("analytics sink: {e}")))?;
            Some(Arc::new(sink))
        } else {
            tracing::warn!("analytics sink not configured, record upload will be skipped");
            None
        };

    let blob: Option<Arc<dyn benchrelay_core::upload::BlobSink>> =
        if cfg.upload.blob.enabled && !cfg.upload.blob.base_url.is_empty() {
            let sink = BlobHttpSink::new(&cfg.upload.blob)
                .map_err(|e| CliError::Config(format!("blob sink: {e}")))?;
            Some(Arc::new(sink))
        } else {
            tracing::warn!("blob sink not configured, file upload will be skipped");
            None
        };

    Ok(app::Sinks { record, blob })
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("benchrelay"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("benchrelay.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
