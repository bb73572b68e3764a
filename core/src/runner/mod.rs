mod io_pump;
mod run;
pub mod types;

pub use run::run;
pub use types::{LaunchSpec, ProcessOutcome, Termination};
