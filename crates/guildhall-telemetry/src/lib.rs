//! Guildhall Telemetry - logging setup for the Guildhall runtime.
//!
//! Installs a global `tracing` subscriber from a [`LogConfig`]: level and
//! per-crate directives, one of four output formats, and stdout, stderr or a
//! rolling file as the target.
//!
//! # Example
//!
//! ```rust,no_run
//! use guildhall_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), guildhall_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("guildhall_interactive=debug");
//!
//! // Keep the guard alive for the life of the process.
//! let _guard = setup_logging(&config)?;
//! tracing::info!("Logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, LoggingGuard, setup_logging,
};
