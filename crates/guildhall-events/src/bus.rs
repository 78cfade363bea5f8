//! Diagnostic bus for broadcasting diagnostics to subscribers.

use std::sync::Arc;

use guildhall_core::{Diagnostic, Notifier};
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::log::log_diagnostic;

/// Default channel capacity for the diagnostic bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts diagnostics to all connected receivers.
///
/// Every diagnostic is logged before it is broadcast, so nothing is lost when
/// no operator sink is subscribed. Cloning the bus yields a handle to the same
/// channel.
#[derive(Debug, Clone)]
pub struct DiagnosticBus {
    sender: broadcast::Sender<Arc<Diagnostic>>,
    capacity: usize,
}

impl DiagnosticBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, capacity }
    }

    /// Log and broadcast a diagnostic.
    ///
    /// Returns the number of receivers that got it.
    pub fn publish(&self, diagnostic: Diagnostic) -> usize {
        log_diagnostic(&diagnostic);
        if let Ok(count) = self.sender.send(Arc::new(diagnostic)) {
            count
        } else {
            trace!("No receivers for diagnostic");
            0
        }
    }

    /// Subscribe to all diagnostics published after this call.
    #[must_use]
    pub fn subscribe(&self) -> DiagnosticReceiver {
        DiagnosticReceiver::new(self.sender.subscribe(), None)
    }

    /// Subscribe only to diagnostics of one kind (e.g. `"handler_failed"`).
    #[must_use]
    pub fn subscribe_kind(&self, kind: &'static str) -> DiagnosticReceiver {
        DiagnosticReceiver::new(self.sender.subscribe(), Some(kind))
    }

    /// Number of connected receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DiagnosticBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DiagnosticBus {
    fn notify(&self, diagnostic: Diagnostic) {
        self.publish(diagnostic);
    }
}

/// Receiver for diagnostics from the bus.
pub struct DiagnosticReceiver {
    receiver: broadcast::Receiver<Arc<Diagnostic>>,
    kind: Option<&'static str>,
}

impl DiagnosticReceiver {
    fn new(receiver: broadcast::Receiver<Arc<Diagnostic>>, kind: Option<&'static str>) -> Self {
        Self { receiver, kind }
    }

    fn matches(&self, diagnostic: &Diagnostic) -> bool {
        self.kind.is_none_or(|kind| diagnostic.kind() == kind)
    }

    /// Receive the next matching diagnostic.
    ///
    /// Returns `None` once the bus is closed.
    pub async fn recv(&mut self) -> Option<Arc<Diagnostic>> {
        loop {
            match self.receiver.recv().await {
                Ok(diagnostic) => {
                    if self.matches(&diagnostic) {
                        return Some(diagnostic);
                    }
                },
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "Diagnostic receiver lagged, diagnostics dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive the next matching diagnostic without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Diagnostic>> {
        loop {
            match self.receiver.try_recv() {
                Ok(diagnostic) => {
                    if self.matches(&diagnostic) {
                        return Some(diagnostic);
                    }
                },
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(skipped = count, "Diagnostic receiver lagged, diagnostics dropped");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildhall_core::MessageId;

    fn handler_failure() -> Diagnostic {
        Diagnostic::handler_failed(MessageId(1), "✅", "boom")
    }

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = DiagnosticBus::new();
        let mut receiver = bus.subscribe();

        assert_eq!(bus.publish(handler_failure()), 1);

        let diagnostic = receiver.recv().await.unwrap();
        assert_eq!(diagnostic.kind(), "handler_failed");
    }

    #[tokio::test]
    async fn no_subscribers_is_fine() {
        let bus = DiagnosticBus::new();
        assert_eq!(bus.publish(handler_failure()), 0);
    }

    #[tokio::test]
    async fn kind_filter_skips_other_diagnostics() {
        let bus = DiagnosticBus::new();
        let mut receiver = bus.subscribe_kind("storage_failure");

        bus.notify(handler_failure());
        bus.notify(Diagnostic::storage_failure("save_page", None, "disk full"));

        let diagnostic = receiver.recv().await.unwrap();
        assert_eq!(diagnostic.kind(), "storage_failure");
        assert!(receiver.try_recv().is_none());
    }

    #[tokio::test]
    async fn clone_shares_channel() {
        let bus = DiagnosticBus::with_capacity(8);
        let clone = bus.clone();
        let mut receiver = bus.subscribe();

        clone.notify(handler_failure());
        assert!(receiver.try_recv().is_some());
        assert_eq!(clone.capacity(), 8);
        assert_eq!(clone.subscriber_count(), 1);
    }
}
