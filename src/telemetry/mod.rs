//! Telemetry for transcoder-iac.
//!
//! Structured logging via the `tracing` crate, in pretty, compact, full or
//! JSON format. Lifecycle code logs with the plain `tracing` macros:
//! `debug!` for request dumps, `info!` for lifecycle transitions and `warn!`
//! for non-fatal service warnings.

pub mod config;
pub mod logging;

pub use config::{LogFormat, LogLevel, LoggingConfig};
pub use logging::{init_from_verbosity, LoggingBuilder};
