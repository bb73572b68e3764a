/// One runner invocation: a resolved executable plus the caller's arguments,
/// forwarded verbatim (no shell expansion, no re-quoting). Working directory
/// and environment are inherited from the parent.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Termination {
    /// Ran to completion and exited, cleanly or not; see `exit_code`.
    Exited,
    /// Killed by a signal without reporting an exit code.
    Signaled,
    /// The operator interrupted the run; the child was killed and the
    /// pipeline must not proceed to the upload phase.
    Interrupted,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    /// Complete output in arrival order, stdout and stderr interleaved as
    /// observed. The same bytes were already echoed to the parent streams.
    pub lines: Vec<String>,
    pub termination: Termination,
    pub duration_ms: u64,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.termination == Termination::Exited && self.exit_code == 0
    }

    pub fn interrupted(&self) -> bool {
        self.termination == Termination::Interrupted
    }
}
