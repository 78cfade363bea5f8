//! Reaction bindings and handler contracts.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use guildhall_core::Diagnostic;
use tracing::{debug, warn};

use crate::boundary::guarded;
use crate::context::InteractionContext;
use crate::message::{DispatchOutcome, InteractiveMessage};
use crate::registry::InteractiveRegistry;

/// What a handler wants done with its message after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Leave the message registered; further reactions keep dispatching.
    Keep,
    /// The interaction is complete; unregister the message.
    Remove,
}

/// The action run when a bound reaction arrives.
///
/// Handlers may touch external state (stores, the transport). Returning an
/// error is not fatal: the engine reports it and keeps the message.
#[async_trait]
pub trait InteractionHandler: Send + Sync {
    /// Handle one reaction.
    async fn invoke(&self, ctx: &InteractionContext) -> anyhow::Result<HandlerOutcome>;
}

/// An [`InteractionHandler`] backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> InteractionHandler for FnHandler<F>
where
    F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<HandlerOutcome>> + Send + 'static,
{
    async fn invoke(&self, ctx: &InteractionContext) -> anyhow::Result<HandlerOutcome> {
        (self.f)(ctx.clone()).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn InteractionHandler>
where
    F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<HandlerOutcome>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// One reaction symbol bound to a handler.
#[derive(Clone)]
pub struct EventBinding {
    symbol: String,
    handler: Arc<dyn InteractionHandler>,
    invalidate_on_fire: bool,
}

impl EventBinding {
    /// Bind `symbol` to `handler`.
    ///
    /// With `invalidate_on_fire`, the owning message is unregistered before
    /// the handler runs, so the handler can run at most once.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        handler: Arc<dyn InteractionHandler>,
        invalidate_on_fire: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            handler,
            invalidate_on_fire,
        }
    }

    /// The bound symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether firing unregisters the message before the handler runs.
    #[must_use]
    pub fn invalidates_on_fire(&self) -> bool {
        self.invalidate_on_fire
    }

    /// Run the firing protocol for `message`.
    ///
    /// The caller holds the message's dispatch turn.
    pub(crate) async fn fire(
        &self,
        message: &Arc<InteractiveMessage>,
        registry: &InteractiveRegistry,
        ctx: &InteractionContext,
    ) -> DispatchOutcome {
        let message_id = message.message_id();

        // Membership check and invalidation are one atomic step for
        // invalidating bindings.
        let invalidated = if self.invalidate_on_fire {
            if !registry.remove_instance(message).await {
                debug!(message_id = %message_id, symbol = %self.symbol, "Message no longer registered");
                return DispatchOutcome::AlreadyRemoved;
            }
            true
        } else {
            if !registry.is_registered(message).await {
                debug!(message_id = %message_id, symbol = %self.symbol, "Message no longer registered");
                return DispatchOutcome::AlreadyRemoved;
            }
            false
        };

        let outcome = match guarded(self.handler.invoke(ctx)).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    message_id = %message_id,
                    symbol = %self.symbol,
                    error = %error,
                    "Handler failed, keeping message"
                );
                registry
                    .notifier()
                    .notify(Diagnostic::handler_failed(message_id, &self.symbol, error));
                HandlerOutcome::Keep
            },
        };

        if outcome == HandlerOutcome::Remove {
            // No-op if invalidation or a concurrent remover got there first.
            registry.remove_instance(message).await;
            DispatchOutcome::Removed
        } else if invalidated {
            DispatchOutcome::Removed
        } else {
            DispatchOutcome::Kept
        }
    }
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("symbol", &self.symbol)
            .field("invalidate_on_fire", &self.invalidate_on_fire)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_accessors() {
        let binding = EventBinding::new(
            "❌",
            handler_fn(|_| async { Ok(HandlerOutcome::Keep) }),
            true,
        );
        assert_eq!(binding.symbol(), "❌");
        assert!(binding.invalidates_on_fire());
        assert!(format!("{binding:?}").contains("❌"));
    }
}
