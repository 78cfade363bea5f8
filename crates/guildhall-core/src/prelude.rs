//! Prelude module - commonly used types for convenient import.
//!
//! Use `use guildhall_core::prelude::*;` to import all essential types.

// Platform handles
pub use crate::{ChannelId, GuildId, MessageId, UserId};

// Access control
pub use crate::AccessLevel;

// Transport collaborator
pub use crate::{ChatTransport, MessageInfo, ReactionEvent, TransportError, TransportResult};

// Diagnostics
pub use crate::{Diagnostic, Notifier};
