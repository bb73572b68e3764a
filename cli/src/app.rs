use std::path::Path;
use std::sync::Arc;

use benchrelay_core::config::AppConfig;
use benchrelay_core::error::CliError;
use benchrelay_core::extract::extract_result_path;
use benchrelay_core::listing::{list_dir, EntryKind};
use benchrelay_core::runner::{self, LaunchSpec, ProcessOutcome};
use benchrelay_core::upload::{
    BlobSink, FilesOutcome, RecordOutcome, RecordSink, UploadCoordinator, UploadReport,
    UploadStatus,
};

use crate::cli::Args;
use crate::resolve;

/// Exit code when the runner succeeded but one or both sinks did not.
pub const EXIT_UPLOADS_FAILED: i32 = 31;

pub struct Sinks {
    pub record: Option<Arc<dyn RecordSink>>,
    pub blob: Option<Arc<dyn BlobSink>>,
}

/// Drive the full pipeline: run the runner, extract the result path, show
/// the task directory, upload to both sinks, and summarize. Returns the
/// process exit code.
#[tracing::instrument(name = "cli.run_pipeline", skip(cfg, args, sinks))]
pub async fn run_pipeline(cfg: &AppConfig, args: &Args, sinks: Sinks) -> Result<i32, CliError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!(run_id = %run_id, "pipeline starting");

    let program = resolve::resolve_runner(args.runner.as_deref(), &cfg.runner)?;
    let forwarded = resolve::ensure_output_arg(
        args.runner_args.clone(),
        args.output_dir.as_deref(),
        &cfg.runner,
    )?;
    let spec = LaunchSpec::new(program, forwarded);

    println!("\n=== Phase 1: Running {} ===\n", spec.program);
    let outcome = runner::run(&spec, cfg.runner.line_channel_capacity).await?;

    if outcome.interrupted() {
        tracing::warn!("execution interrupted, skipping result extraction and uploads");
        return Ok(130);
    }
    if !outcome.success() {
        // The runner may still have written partial results; extraction and
        // uploads proceed, but its exit status is surfaced at the end.
        tracing::error!(exit_code = outcome.exit_code, "runner exited nonzero");
    }

    println!("\n=== Phase 2.1: Extracting result path ===\n");
    let Some(result_path) = extract_result_path(&outcome.lines) else {
        tracing::warn!("no result path found in output");
        return Ok(runner_exit(&outcome, None));
    };
    tracing::info!("found result path: {result_path}");

    show_task_dir(Path::new(&result_path));

    if args.no_upload {
        tracing::info!("--no-upload set, skipping both sinks");
        return Ok(runner_exit(&outcome, None));
    }

    println!("\n=== Phase 2.2: Uploading results ===\n");
    let coordinator = UploadCoordinator::new(
        sinks.record,
        sinks.blob,
        cfg.upload.retry.clone(),
        cfg.upload.concurrency,
    );
    let report = coordinator.upload(Path::new(&result_path)).await;

    print_summary(&outcome, &report);
    Ok(runner_exit(&outcome, Some(&report)))
}

/// Display aid only; the upload phase performs its own walk, so listing
/// failures are reported and otherwise ignored.
fn show_task_dir(result_path: &Path) {
    let dir = if result_path.is_file() {
        match result_path.parent() {
            Some(parent) => parent,
            None => return,
        }
    } else {
        result_path
    };

    match list_dir(dir) {
        Ok(entries) => {
            println!("Task directory {}:", dir.display());
            for entry in entries {
                match entry.kind {
                    EntryKind::File { size } => println!("  {:>10}  {}", size, entry.name),
                    EntryKind::Dir => println!("  {:>10}  {}/", "-", entry.name),
                    EntryKind::Other => println!("  {:>10}  {}", "?", entry.name),
                }
            }
        }
        Err(e) => tracing::error!("cannot list task directory {}: {e}", dir.display()),
    }
}

fn print_summary(outcome: &ProcessOutcome, report: &UploadReport) {
    println!("\n=== Summary ===");
    println!(
        "runner: exit {} ({} ms)",
        outcome.exit_code, outcome.duration_ms
    );
    match &report.record {
        RecordOutcome::Uploaded => println!("record upload: ok"),
        RecordOutcome::MissingFile => println!("record upload: skipped (result.json missing)"),
        RecordOutcome::ParseFailed(e) => println!("record upload: FAILED ({e})"),
        RecordOutcome::Failed(e) => println!("record upload: FAILED ({e})"),
        RecordOutcome::Disabled => println!("record upload: disabled"),
    }
    match &report.files {
        FilesOutcome::Ran(files) => println!(
            "file uploads: {} attempted, {} uploaded, {} failed",
            files.attempted, files.succeeded, files.failed
        ),
        FilesOutcome::Failed(e) => println!("file uploads: FAILED ({e})"),
        FilesOutcome::Disabled => println!("file uploads: disabled"),
    }
}

/// Final exit code. The runner's own failure wins over upload failures so
/// the two are distinguishable; upload failures after a clean run map to a
/// dedicated code.
fn runner_exit(outcome: &ProcessOutcome, report: Option<&UploadReport>) -> i32 {
    if !outcome.success() {
        return if outcome.exit_code > 0 {
            outcome.exit_code
        } else {
            1
        };
    }
    match report {
        Some(report) if report.status == UploadStatus::PartiallyFailed => EXIT_UPLOADS_FAILED,
        _ => 0,
    }
}
