//! Guildhall Test - Shared test utilities for the Guildhall runtime.
//!
//! This crate provides mock collaborators and fixtures that can be used
//! across Guildhall crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! guildhall-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use guildhall_test::{MockTransport, RecordingNotifier, BOT_ID, GUILD, CHANNEL};
//!
//! let transport = MockTransport::new(BOT_ID)
//!     .with_bot_message(MessageId(1), GUILD)
//!     .with_member(GUILD, UserId(7), AccessLevel::Member);
//! let notifier = RecordingNotifier::new();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
