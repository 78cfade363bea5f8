//! Background expiry of interactive messages.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::registry::InteractiveRegistry;

/// Spawn the expiry sweep loop.
///
/// Every `interval`, unregisters expired messages and runs their expiration
/// hooks, so messages nobody reacts to again do not stay resident. The loop
/// exits when `cancel` is cancelled.
#[must_use]
pub fn spawn_sweeper(
    registry: InteractiveRegistry,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Interactive sweeper stopped");
                    break;
                },
                _ = ticker.tick() => {
                    let swept = registry.sweep_expired(Utc::now()).await;
                    if swept > 0 {
                        debug!(swept, "Swept expired interactive messages");
                    }
                },
            }
        }
    })
}
