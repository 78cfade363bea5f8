//! Interactive messages and their dispatch entry point.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use guildhall_core::{ChannelId, Diagnostic, GuildId, MessageId, Notifier};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::binding::{EventBinding, InteractionHandler};
use crate::boundary::guarded;
use crate::context::InteractionContext;
use crate::error::{InteractiveError, InteractiveResult};
use crate::registry::InteractiveRegistry;

/// When an interactive message stops accepting reactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiration {
    /// Accept reactions until explicitly removed.
    #[default]
    Never,
    /// Accept reactions strictly before this instant.
    At(DateTime<Utc>),
}

impl Expiration {
    /// An expiration `ttl` from now. Saturates to [`Expiration::Never`] if
    /// the deadline is not representable.
    #[must_use]
    pub fn after(ttl: Duration) -> Self {
        TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .map_or(Self::Never, Self::At)
    }

    /// Whether the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => false,
            Self::At(deadline) => now >= *deadline,
        }
    }
}

/// Identity of a message on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    /// The message.
    pub message_id: MessageId,
    /// Its channel.
    pub channel_id: ChannelId,
    /// Its guild.
    pub guild_id: GuildId,
}

/// Callback run once when a message expires.
///
/// Typical use: edit the message to show that the prompt timed out.
#[async_trait]
pub trait ExpirationHook: Send + Sync {
    /// Called after the message has been unregistered.
    async fn on_expire(&self, message: MessageRef) -> anyhow::Result<()>;
}

/// An [`ExpirationHook`] backed by an async closure.
pub struct FnExpirationHook<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ExpirationHook for FnExpirationHook<F>
where
    F: Fn(MessageRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_expire(&self, message: MessageRef) -> anyhow::Result<()> {
        (self.f)(message).await
    }
}

/// Wrap an async closure as an expiration hook.
pub fn expiration_hook_fn<F, Fut>(f: F) -> Arc<dyn ExpirationHook>
where
    F: Fn(MessageRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnExpirationHook { f })
}

/// What a dispatch did.
///
/// The platform event loop ignores this; it exists for callers that want to
/// observe the engine (tests, metrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was discarded before reaching a message (self-reaction,
    /// unregistered message, foreign author, malformed context).
    Ignored,
    /// The message has no binding for the symbol.
    Unbound,
    /// The message had expired; this dispatch unregistered it and ran its
    /// expiration hook.
    Expired,
    /// A handler ran and the message stays registered.
    Kept,
    /// A handler ran and the message is no longer registered.
    Removed,
    /// The message was unregistered before its handler could run.
    AlreadyRemoved,
}

/// A message with reaction-driven behavior.
///
/// Built with [`InteractiveMessage::builder`] and handed to
/// [`InteractiveRegistry::register`]. Once built, only its own handlers act
/// on it; the registry owns its lifetime.
pub struct InteractiveMessage {
    reference: MessageRef,
    expiration: Expiration,
    bindings: HashMap<String, EventBinding>,
    on_expire: Option<Arc<dyn ExpirationHook>>,
    /// Serializes dispatches for this message.
    turn: Mutex<()>,
}

impl InteractiveMessage {
    /// Start building an interactive message.
    #[must_use]
    pub fn builder(
        message_id: MessageId,
        channel_id: ChannelId,
        guild_id: GuildId,
    ) -> InteractiveMessageBuilder {
        InteractiveMessageBuilder {
            reference: MessageRef {
                message_id,
                channel_id,
                guild_id,
            },
            expiration: Expiration::Never,
            bindings: Vec::new(),
            on_expire: None,
        }
    }

    /// The message ID.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        self.reference.message_id
    }

    /// The channel ID.
    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.reference.channel_id
    }

    /// The guild ID.
    #[must_use]
    pub fn guild_id(&self) -> GuildId {
        self.reference.guild_id
    }

    /// Full platform identity.
    #[must_use]
    pub fn reference(&self) -> MessageRef {
        self.reference
    }

    /// The expiration deadline.
    #[must_use]
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    /// Whether the message has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_expired_at(now)
    }

    /// Bound symbols, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// The binding for `symbol`, if any.
    #[must_use]
    pub fn binding(&self, symbol: &str) -> Option<&EventBinding> {
        self.bindings.get(symbol)
    }

    /// Route one interaction to this message.
    ///
    /// Expiry takes precedence over bindings: an expired message is
    /// unregistered and its hook run, whatever the symbol.
    pub async fn dispatch(
        self: &Arc<Self>,
        registry: &InteractiveRegistry,
        ctx: &InteractionContext,
    ) -> DispatchOutcome {
        let _turn = self.turn.lock().await;

        if self.is_expired_at(Utc::now()) {
            if registry.remove_instance(self).await {
                debug!(message_id = %self.message_id(), "Message expired on dispatch");
                self.run_expiration_hook(registry.notifier()).await;
                return DispatchOutcome::Expired;
            }
            return DispatchOutcome::AlreadyRemoved;
        }

        let Some(binding) = self.bindings.get(&ctx.symbol) else {
            trace!(
                message_id = %self.message_id(),
                symbol = %ctx.symbol,
                "No binding for symbol"
            );
            return DispatchOutcome::Unbound;
        };

        binding.fire(self, registry, ctx).await
    }

    /// Unregister this message and run its expiration hook if it has
    /// expired at `now`.
    ///
    /// Waits for any in-flight dispatch first, so a handler that completes
    /// the interaction is never followed by the hook. Returns whether this
    /// call expired the message.
    pub(crate) async fn expire_if_due(
        self: &Arc<Self>,
        registry: &InteractiveRegistry,
        now: DateTime<Utc>,
    ) -> bool {
        let _turn = self.turn.lock().await;
        if !self.is_expired_at(now) || !registry.remove_instance(self).await {
            return false;
        }
        self.run_expiration_hook(registry.notifier()).await;
        true
    }

    async fn run_expiration_hook(&self, notifier: &dyn Notifier) {
        let Some(hook) = &self.on_expire else {
            return;
        };
        if let Err(error) = guarded(hook.on_expire(self.reference)).await {
            warn!(message_id = %self.message_id(), error = %error, "Expiration hook failed");
            notifier.notify(Diagnostic::expiration_hook_failed(self.message_id(), error));
        }
    }
}

impl fmt::Debug for InteractiveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveMessage")
            .field("reference", &self.reference)
            .field("expiration", &self.expiration)
            .field("bindings", &self.bindings.values().collect::<Vec<_>>())
            .field("has_expiration_hook", &self.on_expire.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`InteractiveMessage`].
#[must_use]
pub struct InteractiveMessageBuilder {
    reference: MessageRef,
    expiration: Expiration,
    bindings: Vec<EventBinding>,
    on_expire: Option<Arc<dyn ExpirationHook>>,
}

impl InteractiveMessageBuilder {
    /// Expire at an absolute deadline.
    pub fn expires_at(mut self, deadline: DateTime<Utc>) -> Self {
        self.expiration = Expiration::At(deadline);
        self
    }

    /// Expire `ttl` from now.
    pub fn expires_after(mut self, ttl: Duration) -> Self {
        self.expiration = Expiration::after(ttl);
        self
    }

    /// Set the expiration explicitly.
    pub fn expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Add a prepared binding.
    pub fn binding(mut self, binding: EventBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Bind `symbol` to a handler that decides removal by its return value.
    pub fn on(self, symbol: impl Into<String>, handler: Arc<dyn InteractionHandler>) -> Self {
        self.binding(EventBinding::new(symbol, handler, false))
    }

    /// Bind `symbol` to a handler that runs at most once: the message is
    /// unregistered before the handler starts.
    pub fn on_fire_once(
        self,
        symbol: impl Into<String>,
        handler: Arc<dyn InteractionHandler>,
    ) -> Self {
        self.binding(EventBinding::new(symbol, handler, true))
    }

    /// Run `hook` once when the message expires.
    pub fn on_expire(mut self, hook: Arc<dyn ExpirationHook>) -> Self {
        self.on_expire = Some(hook);
        self
    }

    /// Finish the message.
    ///
    /// # Errors
    ///
    /// Returns [`InteractiveError::DuplicateBinding`] if two bindings share a
    /// symbol, or [`InteractiveError::EmptySymbol`] for an empty symbol.
    pub fn build(self) -> InteractiveResult<Arc<InteractiveMessage>> {
        let message_id = self.reference.message_id;
        let mut bindings = HashMap::with_capacity(self.bindings.len());
        for binding in self.bindings {
            if binding.symbol().is_empty() {
                return Err(InteractiveError::EmptySymbol(message_id));
            }
            if bindings.contains_key(binding.symbol()) {
                return Err(InteractiveError::DuplicateBinding {
                    message_id,
                    symbol: binding.symbol().to_string(),
                });
            }
            bindings.insert(binding.symbol().to_string(), binding);
        }

        Ok(Arc::new(InteractiveMessage {
            reference: self.reference,
            expiration: self.expiration,
            bindings,
            on_expire: self.on_expire,
            turn: Mutex::new(()),
        }))
    }
}
