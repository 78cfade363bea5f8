//! Common imports for setting up logging.
//!
//! ```rust
//! use guildhall_telemetry::prelude::*;
//! ```

pub use crate::{
    FileRotation, LogConfig, LogFormat, LogTarget, LoggingGuard, TelemetryError,
    TelemetryResult, setup_logging,
};
