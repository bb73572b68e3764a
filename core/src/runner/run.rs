use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::RunnerError;

use super::io_pump::{self, LineTap};
use super::types::{LaunchSpec, ProcessOutcome, Termination};

enum WaitEnd {
    Status(std::io::Result<std::process::ExitStatus>),
    Interrupted,
}

/// Launch the runner and pump its output until it exits.
///
/// Both child streams are tee'd: bytes reach the parent terminal as they
/// arrive, and complete lines are collected into the outcome for the marker
/// scan. A nonzero exit still produces an outcome; only a failed spawn or a
/// broken wait is an error. Ctrl-C kills the child and marks the outcome
/// `Interrupted` so the caller can abort before the upload phase.
pub async fn run(
    spec: &LaunchSpec,
    line_channel_capacity: usize,
) -> Result<ProcessOutcome, RunnerError> {
    run_until(spec, line_channel_capacity, tokio::signal::ctrl_c()).await
}

async fn run_until<F>(
    spec: &LaunchSpec,
    line_channel_capacity: usize,
    interrupt: F,
) -> Result<ProcessOutcome, RunnerError>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RunnerError::Launch(format!("{}: {e}", spec.program)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Launch("no stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Launch("no stderr".into()))?;

    let started_at = Instant::now();

    let (line_tx, mut line_rx) = mpsc::channel::<LineTap>(line_channel_capacity.max(1));
    let out_task = io_pump::pump_stdout(stdout, line_tx.clone());
    let err_task = io_pump::pump_stderr(stderr, line_tx);

    let mut lines: Vec<String> = Vec::new();
    let mut taps_open = true;

    let end = {
        let wait_fut = child.wait();
        tokio::pin!(wait_fut);
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                res = &mut wait_fut => break WaitEnd::Status(res),

                tap = line_rx.recv(), if taps_open => {
                    match tap {
                        Some(tap) => lines.push(tap.line),
                        None => taps_open = false,
                    }
                }

                _ = &mut interrupt => break WaitEnd::Interrupted,
            }
        }
    };

    let (exit_code, termination) = match end {
        WaitEnd::Interrupted => {
            tracing::warn!("interrupt received, killing runner");
            let _ = child.kill().await;
            (130, Termination::Interrupted)
        }
        WaitEnd::Status(res) => {
            let status = res.map_err(RunnerError::Wait)?;
            match status.code() {
                Some(code) => (code, Termination::Exited),
                None => (-1, Termination::Signaled),
            }
        }
    };

    // Drain before joining the pumps: a pump may still be parked in
    // `send().await` on a full channel, and only finishes once the receiver
    // empties it. The loop ends when both senders are dropped.
    while let Some(tap) = line_rx.recv().await {
        lines.push(tap.line);
    }

    if let Ok(Err(e)) = out_task.await {
        tracing::warn!("stdout pump ended with error: {e}");
    }
    if let Ok(Err(e)) = err_task.await {
        tracing::warn!("stderr pump ended with error: {e}");
    }

    let duration_ms = started_at.elapsed().as_millis() as u64;
    tracing::debug!(
        exit_code,
        duration_ms,
        lines = lines.len(),
        "runner finished"
    );

    Ok(ProcessOutcome {
        exit_code,
        lines,
        termination,
        duration_ms,
    })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwards_args_in_order() {
        let spec = LaunchSpec::new(
            "/bin/sh",
            vec![
                "-c".to_string(),
                r#"printf '%s\n' "$@""#.to_string(),
                "sh".to_string(),
                "--flag".to_string(),
                "a b".to_string(),
                "c".to_string(),
            ],
        );
        let outcome = run(&spec, 64).await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.lines, vec!["--flag", "a b", "c"]);
    }

    #[tokio::test]
    async fn nonzero_exit_still_yields_outcome() {
        let spec = LaunchSpec::new(
            "/bin/sh",
            vec!["-c".to_string(), "echo partial; exit 3".to_string()],
        );
        let outcome = run(&spec, 64).await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.termination, Termination::Exited);
        assert_eq!(outcome.lines, vec!["partial"]);
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let spec = LaunchSpec::new("/nonexistent/bench-runner", vec![]);
        let err = run(&spec, 64).await.unwrap_err();
        assert!(matches!(err, RunnerError::Launch(_)));
    }

    #[tokio::test]
    async fn drains_output_beyond_channel_capacity() {
        let spec = LaunchSpec::new(
            "/bin/sh",
            vec![
                "-c".to_string(),
                "i=0; while [ $i -lt 2000 ]; do echo line$i; i=$((i+1)); done".to_string(),
            ],
        );
        // Capacity 1 forces the pumps to park on a full channel while the
        // child is already gone; the run loop must keep receiving.
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(30), run(&spec, 1))
            .await
            .expect("run loop stalled against a full line channel")
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.lines.len(), 2000);
        assert_eq!(outcome.lines[1999], "line1999");
    }

    #[tokio::test]
    async fn interrupt_kills_child_and_reports_interrupted() {
        let spec = LaunchSpec::new(
            "/bin/sh",
            vec!["-c".to_string(), "echo started; exec sleep 30".to_string()],
        );
        let interrupt = async {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok::<(), std::io::Error>(())
        };

        let started = std::time::Instant::now();
        let outcome = run_until(&spec, 64, interrupt).await.unwrap();

        assert!(outcome.interrupted());
        assert_eq!(outcome.exit_code, 130);
        assert_eq!(outcome.termination, Termination::Interrupted);
        assert_eq!(outcome.lines, vec!["started"]);
        // The child would have run for 30s; the kill must cut that short.
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn interleaves_stdout_and_stderr_lines() {
        let spec = LaunchSpec::new(
            "/bin/sh",
            vec![
                "-c".to_string(),
                "echo out1; echo err1 1>&2; echo out2".to_string(),
            ],
        );
        let outcome = run(&spec, 64).await.unwrap();
        assert_eq!(outcome.lines.len(), 3);
        assert!(outcome.lines.contains(&"err1".to_string()));
    }
}
