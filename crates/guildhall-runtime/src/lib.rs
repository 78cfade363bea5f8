//! Guildhall Runtime - process wiring for the interactive message engine.
//!
//! Starts one [`InteractiveRegistry`](guildhall_interactive::InteractiveRegistry)
//! with its expiry sweeper, routes every failure to a
//! [`DiagnosticBus`](guildhall_events::DiagnosticBus), and opens paged stores
//! under the configured data directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use guildhall_config::Config;
//! use guildhall_runtime::{Runtime, config_bridge};
//!
//! # async fn example(transport: Arc<dyn guildhall_core::ChatTransport>)
//! #     -> guildhall_runtime::RuntimeResult<()> {
//! let config = Config::load(None)?;
//! let _logging = config_bridge::init_logging(&config)?;
//!
//! let runtime = Runtime::start(config, transport).await?;
//! // transport event loop:
//! //     runtime.registry().handle_event(event).await;
//! runtime.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config_bridge;
pub mod prelude;

mod error;
mod runtime;

pub use error::{RuntimeError, RuntimeResult};
pub use runtime::Runtime;
