//! Mock collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use guildhall_core::{
    AccessLevel, ChannelId, ChatTransport, Diagnostic, GuildId, MessageId, MessageInfo, Notifier,
    TransportError, TransportResult, UserId,
};

/// An outbound call captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCall {
    /// `send_message`
    Send {
        /// Target channel.
        channel: ChannelId,
        /// Content sent.
        content: String,
    },
    /// `edit_message`
    Edit {
        /// Channel of the message.
        channel: ChannelId,
        /// Edited message.
        message: MessageId,
        /// New content.
        content: String,
    },
    /// `delete_message`
    Delete {
        /// Channel of the message.
        channel: ChannelId,
        /// Deleted message.
        message: MessageId,
    },
    /// `add_reaction`
    React {
        /// Channel of the message.
        channel: ChannelId,
        /// Reacted message.
        message: MessageId,
        /// Marker symbol.
        symbol: String,
    },
}

#[derive(Debug, Default)]
struct TransportState {
    messages: HashMap<MessageId, MessageInfo>,
    members: HashMap<(GuildId, UserId), AccessLevel>,
    calls: Vec<OutboundCall>,
    fail_outbound: bool,
}

/// In-memory [`ChatTransport`] for tests.
///
/// Uses `std::sync::Mutex` internally so builder methods work without a
/// runtime. Clones share state.
#[derive(Debug, Clone)]
pub struct MockTransport {
    self_id: UserId,
    state: Arc<Mutex<TransportState>>,
    next_message: Arc<AtomicU64>,
}

impl MockTransport {
    /// A transport whose own identity is `self_id`.
    #[must_use]
    pub fn new(self_id: UserId) -> Self {
        Self {
            self_id,
            state: Arc::new(Mutex::new(TransportState::default())),
            next_message: Arc::new(AtomicU64::new(90_000)),
        }
    }

    fn with_state(self, f: impl FnOnce(&mut TransportState)) -> Self {
        if let Ok(mut guard) = self.state.lock() {
            f(&mut guard);
        }
        self
    }

    /// Make `message` resolvable with the given author and guild.
    #[must_use]
    pub fn with_message(self, message: MessageId, info: MessageInfo) -> Self {
        self.with_state(|s| {
            s.messages.insert(message, info);
        })
    }

    /// Make `message` resolvable as authored by the bot in `guild`.
    #[must_use]
    pub fn with_bot_message(self, message: MessageId, guild: GuildId) -> Self {
        let author_id = self.self_id;
        self.with_message(
            message,
            MessageInfo {
                author_id,
                guild_id: Some(guild),
            },
        )
    }

    /// Give `user` an access level in `guild`.
    #[must_use]
    pub fn with_member(self, guild: GuildId, user: UserId, level: AccessLevel) -> Self {
        self.with_state(|s| {
            s.members.insert((guild, user), level);
        })
    }

    /// Make every outbound call fail.
    #[must_use]
    pub fn failing_outbound(self) -> Self {
        self.with_state(|s| s.fail_outbound = true)
    }

    /// All outbound calls so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: OutboundCall) -> TransportResult<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        if guard.fail_outbound {
            return Err(TransportError::Forbidden("mock outbound disabled".to_string()));
        }
        guard.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    fn self_id(&self) -> UserId {
        self.self_id
    }

    async fn resolve_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
    ) -> Option<MessageInfo> {
        self.state.lock().ok()?.messages.get(&message).copied()
    }

    async fn resolve_access_level(&self, guild: GuildId, user: UserId) -> Option<AccessLevel> {
        self.state.lock().ok()?.members.get(&(guild, user)).copied()
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> TransportResult<MessageId> {
        self.record(OutboundCall::Send {
            channel,
            content: content.to_string(),
        })?;
        Ok(MessageId(self.next_message.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> TransportResult<()> {
        self.record(OutboundCall::Edit {
            channel,
            message,
            content: content.to_string(),
        })
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> TransportResult<()> {
        self.record(OutboundCall::Delete { channel, message })
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> TransportResult<()> {
        self.record(OutboundCall::React {
            channel,
            message,
            symbol: symbol.to_string(),
        })
    }
}

/// A [`Notifier`] that keeps every diagnostic for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// How many diagnostics of `kind` were recorded.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.diagnostics
            .lock()
            .map(|d| d.iter().filter(|diag| diag.kind() == kind).count())
            .unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push(diagnostic);
        }
    }
}
