//! Common identifiers and event builders.

use guildhall_core::{ChannelId, GuildId, MessageId, ReactionEvent, UserId};

/// The bot's own user ID in tests.
pub const BOT_ID: UserId = UserId(1);

/// The guild used by default in tests.
pub const GUILD: GuildId = GuildId(1000);

/// The channel used by default in tests.
pub const CHANNEL: ChannelId = ChannelId(2000);

/// A member who is not the bot.
pub const ALICE: UserId = UserId(501);

/// A second member who is not the bot.
pub const BOB: UserId = UserId(502);

/// A reaction by `actor` on `message` in [`CHANNEL`].
#[must_use]
pub fn reaction(message: MessageId, actor: UserId, symbol: &str) -> ReactionEvent {
    ReactionEvent::new(message, CHANNEL, actor, symbol)
}

/// Install a test-friendly tracing subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
