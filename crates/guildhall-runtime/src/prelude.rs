//! Prelude module - commonly used types for convenient import.
//!
//! Use `use guildhall_runtime::prelude::*;` to pull in the runtime and the
//! engine types a bot needs to build interactive messages.

pub use crate::{Runtime, RuntimeError, RuntimeResult};

pub use guildhall_config::Config;
pub use guildhall_core::prelude::*;
pub use guildhall_interactive::{
    DispatchOutcome, Expiration, HandlerOutcome, InteractionContext, InteractiveMessage,
    InteractiveRegistry, expiration_hook_fn, handler_fn,
};
pub use guildhall_storage::{EntryId, PageStorable, PagedStore};
