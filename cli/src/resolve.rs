use std::path::{Path, PathBuf};

use benchrelay_core::config::{data_dir, RunnerConfig};
use benchrelay_core::error::CliError;

const OUTPUT_FLAGS: [&str; 3] = ["-o", "--output", "--jobs-dir"];
const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// Resolve the runner executable: explicit flag, then config/env path, then
/// a local virtual-environment copy, then PATH lookup.
pub fn resolve_runner(flag: Option<&str>, cfg: &RunnerConfig) -> Result<String, CliError> {
    if let Some(path) = flag {
        return existing(&shellexpand::tilde(path));
    }
    if let Some(path) = cfg.path.as_deref() {
        return existing(&shellexpand::tilde(path));
    }

    let venv = Path::new(".venv/bin").join(&cfg.binary_name);
    if venv.exists() {
        return Ok(venv.to_string_lossy().to_string());
    }

    which::which(&cfg.binary_name)
        .map(|p| p.to_string_lossy().to_string())
        .map_err(|_| {
            CliError::Config(format!(
                "runner executable '{}' not found; pass --runner or set BENCHRELAY_RUNNER_PATH",
                cfg.binary_name
            ))
        })
}

fn existing(path: &str) -> Result<String, CliError> {
    if Path::new(path).exists() {
        Ok(path.to_string())
    } else {
        Err(CliError::Config(format!(
            "runner executable not found at: {path}"
        )))
    }
}

/// Whether this runner invocation produces output that needs a directory.
/// `run` anywhere or a leading `jobs start` qualifies; help requests never do.
pub fn needs_output_arg(args: &[String]) -> bool {
    if args.iter().any(|a| HELP_FLAGS.contains(&a.as_str())) {
        return false;
    }
    if args.len() >= 2 && args[0] == "jobs" && args[1] == "start" {
        return true;
    }
    args.iter().any(|a| a == "run")
}

/// Whether the caller already picked an output directory.
pub fn has_output_arg(args: &[String]) -> bool {
    args.iter().any(|a| {
        OUTPUT_FLAGS.contains(&a.as_str())
            || OUTPUT_FLAGS.iter().any(|f| a.starts_with(&format!("{f}=")))
    })
}

/// Append `-o <default>` when the command needs an output directory and the
/// caller didn't supply one. All other arguments pass through untouched.
pub fn ensure_output_arg(
    args: Vec<String>,
    flag: Option<&str>,
    cfg: &RunnerConfig,
) -> Result<Vec<String>, CliError> {
    if !needs_output_arg(&args) || has_output_arg(&args) {
        return Ok(args);
    }

    let dir = default_output_dir(flag, cfg)?;
    tracing::info!(
        "no output directory specified, using default: {}",
        dir.display()
    );
    let mut args = args;
    args.push("-o".to_string());
    args.push(dir.to_string_lossy().to_string());
    Ok(args)
}

fn default_output_dir(flag: Option<&str>, cfg: &RunnerConfig) -> Result<PathBuf, CliError> {
    let dir = if let Some(d) = flag {
        PathBuf::from(shellexpand::tilde(d).to_string())
    } else if let Some(d) = cfg.default_output_dir.as_deref() {
        PathBuf::from(shellexpand::tilde(d).to_string())
    } else {
        data_dir()
            .map_err(|e| CliError::Config(e.to_string()))?
            .join("jobs")
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
