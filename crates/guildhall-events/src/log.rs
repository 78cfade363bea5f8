//! Log-only diagnostic delivery.

use guildhall_core::{Diagnostic, Notifier};
use tracing::{error, warn};

/// Write a diagnostic to the `tracing` log with structured fields.
pub fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::HandlerFailed {
            metadata,
            message_id,
            symbol,
            error,
        } => {
            error!(
                diagnostic_id = %metadata.id,
                message_id = %message_id,
                symbol = %symbol,
                error = %error,
                "Interactive handler failed"
            );
        },
        Diagnostic::ExpirationHookFailed {
            metadata,
            message_id,
            error,
        } => {
            warn!(
                diagnostic_id = %metadata.id,
                message_id = %message_id,
                error = %error,
                "Expiration hook failed"
            );
        },
        Diagnostic::StorageFailure {
            metadata,
            operation,
            path,
            error,
        } => {
            error!(
                diagnostic_id = %metadata.id,
                operation = %operation,
                path = ?path,
                error = %error,
                "Storage operation failed"
            );
        },
    }
}

/// A [`Notifier`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
    }
}
