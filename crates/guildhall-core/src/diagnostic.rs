//! Operator diagnostics.
//!
//! Failures that must never reach the platform event loop (a handler that
//! errored, a page file that could not be written) are converted into a
//! [`Diagnostic`] and handed to a [`Notifier`]. The notifier decides where
//! they go: a log, an operator channel, a test recorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::ids::MessageId;

/// Metadata common to every diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMetadata {
    /// Unique diagnostic identifier.
    pub id: Uuid,
    /// When the diagnostic was raised.
    pub timestamp: DateTime<Utc>,
    /// Component that raised it (e.g. `interactive`, `storage`).
    pub source: String,
}

impl DiagnosticMetadata {
    /// Create metadata stamped with the current time.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// A failure reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An event handler returned an error or panicked.
    HandlerFailed {
        /// Diagnostic metadata.
        metadata: DiagnosticMetadata,
        /// Message the handler was bound to.
        message_id: MessageId,
        /// Symbol that triggered the handler.
        symbol: String,
        /// Rendered error.
        error: String,
    },
    /// An expiration hook returned an error or panicked.
    ExpirationHookFailed {
        /// Diagnostic metadata.
        metadata: DiagnosticMetadata,
        /// Message whose hook failed.
        message_id: MessageId,
        /// Rendered error.
        error: String,
    },
    /// A storage read or write failed.
    StorageFailure {
        /// Diagnostic metadata.
        metadata: DiagnosticMetadata,
        /// Operation that failed (e.g. `load`, `save_page`).
        operation: String,
        /// File involved, if any.
        path: Option<PathBuf>,
        /// Rendered error.
        error: String,
    },
}

impl Diagnostic {
    /// A handler failure for `message_id` / `symbol`.
    #[must_use]
    pub fn handler_failed(
        message_id: MessageId,
        symbol: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::HandlerFailed {
            metadata: DiagnosticMetadata::new("interactive"),
            message_id,
            symbol: symbol.into(),
            error: error.into(),
        }
    }

    /// An expiration hook failure for `message_id`.
    #[must_use]
    pub fn expiration_hook_failed(message_id: MessageId, error: impl Into<String>) -> Self {
        Self::ExpirationHookFailed {
            metadata: DiagnosticMetadata::new("interactive"),
            message_id,
            error: error.into(),
        }
    }

    /// A storage failure during `operation`.
    #[must_use]
    pub fn storage_failure(
        operation: impl Into<String>,
        path: Option<PathBuf>,
        error: impl Into<String>,
    ) -> Self {
        Self::StorageFailure {
            metadata: DiagnosticMetadata::new("storage"),
            operation: operation.into(),
            path,
            error: error.into(),
        }
    }

    /// Get the diagnostic type as a string.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HandlerFailed { .. } => "handler_failed",
            Self::ExpirationHookFailed { .. } => "expiration_hook_failed",
            Self::StorageFailure { .. } => "storage_failure",
        }
    }

    /// Get the diagnostic metadata.
    #[must_use]
    pub fn metadata(&self) -> &DiagnosticMetadata {
        match self {
            Self::HandlerFailed { metadata, .. }
            | Self::ExpirationHookFailed { metadata, .. }
            | Self::StorageFailure { metadata, .. } => metadata,
        }
    }
}

/// Sink for operator diagnostics.
///
/// `notify` must not block; implementations that forward to slow sinks
/// should queue internally.
pub trait Notifier: Send + Sync {
    /// Report a diagnostic.
    fn notify(&self, diagnostic: Diagnostic);
}
