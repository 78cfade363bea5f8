//! Guildhall Events - Diagnostic delivery for the Guildhall runtime.
//!
//! This crate provides two [`Notifier`](guildhall_core::Notifier)
//! implementations:
//!
//! 1. [`DiagnosticBus`]: logs every diagnostic and broadcasts it to async
//!    subscribers, such as an operator notification channel.
//! 2. [`TracingNotifier`]: logs only, for deployments without an operator sink.
//!
//! # Example
//!
//! ```rust
//! use guildhall_core::{Diagnostic, MessageId, Notifier};
//! use guildhall_events::DiagnosticBus;
//!
//! # async fn example() {
//! let bus = DiagnosticBus::new();
//! let mut receiver = bus.subscribe();
//!
//! bus.notify(Diagnostic::handler_failed(MessageId(1), "✅", "boom"));
//!
//! let diagnostic = receiver.recv().await.unwrap();
//! assert_eq!(diagnostic.kind(), "handler_failed");
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod bus;
mod log;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, DiagnosticBus, DiagnosticReceiver};
pub use log::{TracingNotifier, log_diagnostic};
