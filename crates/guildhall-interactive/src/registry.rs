//! Process-wide directory of interactive messages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use guildhall_core::{ChatTransport, MessageId, Notifier, ReactionEvent};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use crate::context::PartialContext;
use crate::error::{InteractiveError, InteractiveResult};
use crate::message::{DispatchOutcome, InteractiveMessage};

struct Inner {
    messages: RwLock<HashMap<MessageId, Arc<InteractiveMessage>>>,
    transport: Arc<dyn ChatTransport>,
    notifier: Arc<dyn Notifier>,
}

/// Maps message IDs to their interactive behavior and routes reactions.
///
/// Create one per process at startup. Cloning yields a handle to the same
/// registry.
///
/// Handlers that capture a registry clone form a reference cycle with it.
/// The cycle is broken when the message is removed, or by [`clear`] at
/// shutdown.
///
/// [`clear`]: Self::clear
#[derive(Clone)]
pub struct InteractiveRegistry {
    inner: Arc<Inner>,
}

impl InteractiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                messages: RwLock::new(HashMap::new()),
                transport,
                notifier,
            }),
        }
    }

    /// The transport used to resolve events.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.inner.transport
    }

    /// The sink for handler and hook failures.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// Register a message.
    ///
    /// # Errors
    ///
    /// Returns [`InteractiveError::AlreadyRegistered`] if a message with the
    /// same ID is registered. Callers may ignore it.
    pub async fn register(&self, message: Arc<InteractiveMessage>) -> InteractiveResult<()> {
        let message_id = message.message_id();
        let mut guard = self.inner.messages.write().await;
        if guard.contains_key(&message_id) {
            return Err(InteractiveError::AlreadyRegistered(message_id));
        }
        guard.insert(message_id, message);
        debug!(message_id = %message_id, "Registered interactive message");
        Ok(())
    }

    /// Register a message and add a reaction marker for each of its symbols,
    /// so users have something to click.
    ///
    /// Marker failures are logged; the message stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`InteractiveError::AlreadyRegistered`] as [`register`] does.
    ///
    /// [`register`]: Self::register
    pub async fn register_with_markers(
        &self,
        message: Arc<InteractiveMessage>,
    ) -> InteractiveResult<()> {
        self.register(Arc::clone(&message)).await?;

        let mut symbols: Vec<&str> = message.symbols().collect();
        symbols.sort_unstable();
        for symbol in symbols {
            if let Err(e) = self
                .inner
                .transport
                .add_reaction(message.channel_id(), message.message_id(), symbol)
                .await
            {
                warn!(
                    message_id = %message.message_id(),
                    symbol = %symbol,
                    error = %e,
                    "Failed to add reaction marker"
                );
            }
        }
        Ok(())
    }

    /// Whether a message with this ID is registered.
    pub async fn has(&self, message_id: MessageId) -> bool {
        self.inner.messages.read().await.contains_key(&message_id)
    }

    /// Look up a registered message.
    pub async fn get(&self, message_id: MessageId) -> Option<Arc<InteractiveMessage>> {
        self.inner.messages.read().await.get(&message_id).cloned()
    }

    /// Unregister a message by ID. Does not run its expiration hook.
    ///
    /// Returns whether anything was removed.
    pub async fn remove(&self, message_id: MessageId) -> bool {
        let removed = self.inner.messages.write().await.remove(&message_id).is_some();
        if removed {
            debug!(message_id = %message_id, "Removed interactive message");
        }
        removed
    }

    /// Whether this exact message instance is the one registered under its ID.
    pub(crate) async fn is_registered(&self, message: &Arc<InteractiveMessage>) -> bool {
        self.inner
            .messages
            .read()
            .await
            .get(&message.message_id())
            .is_some_and(|current| Arc::ptr_eq(current, message))
    }

    /// Unregister this exact message instance.
    ///
    /// A different message later registered under the same ID is left alone.
    /// Returns `true` for exactly one caller per registration.
    pub(crate) async fn remove_instance(&self, message: &Arc<InteractiveMessage>) -> bool {
        let message_id = message.message_id();
        let mut guard = self.inner.messages.write().await;
        let is_same = guard
            .get(&message_id)
            .is_some_and(|current| Arc::ptr_eq(current, message));
        if is_same {
            guard.remove(&message_id);
            trace!(message_id = %message_id, "Unregistered interactive message");
        }
        is_same
    }

    /// Number of registered messages.
    pub async fn len(&self) -> usize {
        self.inner.messages.read().await.len()
    }

    /// Whether no messages are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.messages.read().await.is_empty()
    }

    /// Unregister everything without running expiration hooks.
    ///
    /// Used at shutdown.
    pub async fn clear(&self) {
        let drained = {
            let mut guard = self.inner.messages.write().await;
            std::mem::take(&mut *guard)
        };
        if !drained.is_empty() {
            info!(count = drained.len(), "Cleared interactive registry");
        }
    }

    /// Unregister every message expired at `now` and run each one's
    /// expiration hook.
    ///
    /// A message with a dispatch in flight is swept only after it finishes,
    /// and only if the handler left it registered.
    ///
    /// Returns the number of messages swept.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let candidates: Vec<Arc<InteractiveMessage>> = self
            .inner
            .messages
            .read()
            .await
            .values()
            .filter(|message| message.is_expired_at(now))
            .cloned()
            .collect();

        let mut swept = 0usize;
        for message in &candidates {
            if message.expire_if_due(self, now).await {
                debug!(message_id = %message.message_id(), "Swept expired message");
                swept = swept.saturating_add(1);
            }
        }
        swept
    }

    /// Handle one reaction from the platform.
    ///
    /// This is the transport-facing entry point. It never fails: events that
    /// do not concern an interactive message are discarded quietly, and
    /// handler failures are reported through the notifier.
    pub async fn handle_event(&self, event: ReactionEvent) -> DispatchOutcome {
        let self_id = self.inner.transport.self_id();
        if event.actor_is_self || event.actor_id == self_id {
            trace!(message_id = %event.message_id, "Ignoring own reaction");
            return DispatchOutcome::Ignored;
        }

        // Most messages are not interactive; check before any transport call.
        let Some(message) = self.get(event.message_id).await else {
            return DispatchOutcome::Ignored;
        };

        let partial = self.resolve(&event).await;
        if partial.author_id != Some(self_id) {
            trace!(message_id = %event.message_id, "Ignoring reaction on foreign message");
            return DispatchOutcome::Ignored;
        }

        let Some(ctx) = partial.into_context() else {
            debug!(
                message_id = %event.message_id,
                actor_id = %event.actor_id,
                "Dropping malformed interaction"
            );
            return DispatchOutcome::Ignored;
        };

        message.dispatch(self, &ctx).await
    }

    /// Resolve as much of the interaction as the transport allows.
    async fn resolve(&self, event: &ReactionEvent) -> PartialContext {
        let transport = &self.inner.transport;
        let info = transport
            .resolve_message(event.channel_id, event.message_id)
            .await;
        let guild_id = info.and_then(|i| i.guild_id);
        let access_level = match guild_id {
            Some(guild) => transport.resolve_access_level(guild, event.actor_id).await,
            None => None,
        };

        PartialContext {
            author_id: info.map(|i| i.author_id),
            actor_id: Some(event.actor_id),
            access_level,
            channel_id: Some(event.channel_id),
            guild_id,
            message_id: info.map(|_| event.message_id),
            symbol: Some(event.symbol.clone()),
        }
    }
}

impl fmt::Debug for InteractiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
