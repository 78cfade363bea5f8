//! Error types for the interactive engine.

use guildhall_core::MessageId;
use thiserror::Error;

/// Errors produced while building or registering interactive messages.
///
/// Dispatch itself never fails; see [`DispatchOutcome`](crate::DispatchOutcome).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractiveError {
    /// A message with this ID is already registered.
    #[error("message {0} is already registered")]
    AlreadyRegistered(MessageId),

    /// Two bindings on one message share a symbol.
    #[error("message {message_id} already has a binding for {symbol:?}")]
    DuplicateBinding {
        /// The message being built.
        message_id: MessageId,
        /// The repeated symbol.
        symbol: String,
    },

    /// A binding was declared with an empty symbol.
    #[error("message {0} has a binding with an empty symbol")]
    EmptySymbol(MessageId),
}

/// Convenience alias.
pub type InteractiveResult<T> = Result<T, InteractiveError>;
