//! Pipeline assembly for the `benchrelay` binary. Exposed as a library so
//! integration tests can drive the pipeline with substitute sinks.

pub mod app;
pub mod cli;
pub mod resolve;
