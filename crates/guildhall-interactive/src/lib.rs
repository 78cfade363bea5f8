//! Guildhall Interactive - Reaction-driven behavior attached to messages.
//!
//! A feature that sends a message can make it *interactive* by registering an
//! [`InteractiveMessage`] with the process-wide [`InteractiveRegistry`]. Each
//! message carries a set of [`EventBinding`]s, one per reaction symbol, and an
//! optional expiration deadline. When the platform reports a reaction, the
//! registry resolves it into an [`InteractionContext`] and routes it to the
//! matching binding.
//!
//! # Guarantees
//!
//! - Dispatches for one message run one at a time, in arrival order.
//! - A binding marked *invalidate-on-fire* unregisters its message before the
//!   handler runs, so its handler runs at most once.
//! - Expired messages never run a symbol handler; their expiration hook runs
//!   exactly once, whether expiry is noticed by a dispatch or by the sweeper.
//! - Handler errors and panics are reported as diagnostics and never reach the
//!   platform event loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use guildhall_interactive::{HandlerOutcome, InteractiveMessage, handler_fn};
//!
//! let message = InteractiveMessage::builder(message_id, channel_id, guild_id)
//!     .expires_after(std::time::Duration::from_secs(300))
//!     .on_fire_once("✅", handler_fn(|ctx| async move {
//!         tracing::info!(actor = %ctx.actor_id, "confirmed");
//!         Ok(HandlerOutcome::Remove)
//!     }))
//!     .build()?;
//!
//! registry.register(message).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod binding;
mod boundary;
mod context;
mod error;
mod message;
mod registry;
mod sweeper;

pub use binding::{EventBinding, FnHandler, HandlerOutcome, InteractionHandler, handler_fn};
pub use context::{InteractionContext, PartialContext};
pub use error::{InteractiveError, InteractiveResult};
pub use message::{
    DispatchOutcome, Expiration, ExpirationHook, FnExpirationHook, InteractiveMessage,
    InteractiveMessageBuilder, MessageRef, expiration_hook_fn,
};
pub use registry::InteractiveRegistry;
pub use sweeper::spawn_sweeper;
