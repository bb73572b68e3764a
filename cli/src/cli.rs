use clap::Parser;

/// Run a benchmark runner and relay its results to the configured sinks.
///
/// Everything after the wrapper's own flags is forwarded to the runner
/// verbatim: `benchrelay --runner ./bin/bench-runner run --suite full`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "benchrelay", version, about)]
pub struct Args {
    /// Path to the runner executable. Falls back to BENCHRELAY_RUNNER_PATH,
    /// then `.venv/bin/<binary_name>`, then PATH lookup.
    #[arg(long)]
    pub runner: Option<String>,

    /// Default output directory injected into `run` / `jobs start`
    /// invocations that don't specify one.
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,

    /// Run and extract only; skip both upload sinks.
    #[arg(long = "no-upload")]
    pub no_upload: bool,

    /// Arguments forwarded to the runner unmodified and in order.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub runner_args: Vec<String>,
}
