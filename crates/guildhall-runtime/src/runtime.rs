//! The assembled runtime.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use guildhall_config::Config;
use guildhall_core::{ChannelId, ChatTransport, GuildId, MessageId};
use guildhall_events::DiagnosticBus;
use guildhall_interactive::{
    InteractiveMessage, InteractiveMessageBuilder, InteractiveRegistry, spawn_sweeper,
};
use guildhall_storage::{PageStorable, PagedStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config_bridge;
use crate::error::{RuntimeError, RuntimeResult};

/// One process's interactive registry, expiry sweeper, diagnostics bus and
/// store directory.
///
/// Dropping the runtime stops the sweeper; call [`shutdown`](Self::shutdown)
/// to also wait for it and release registered messages.
pub struct Runtime {
    config: Config,
    data_dir: PathBuf,
    diagnostics: DiagnosticBus,
    registry: InteractiveRegistry,
    cancel: CancellationToken,
    sweeper: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Build the runtime around `transport` and start the sweeper.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined or it cannot
    /// be created.
    pub async fn start(config: Config, transport: Arc<dyn ChatTransport>) -> RuntimeResult<Self> {
        let data_dir = config.storage.resolve_data_dir()?;
        tokio::fs::create_dir_all(&data_dir).await?;

        let diagnostics = DiagnosticBus::new();
        let registry = InteractiveRegistry::new(transport, Arc::new(diagnostics.clone()));
        let cancel = CancellationToken::new();
        let sweeper = spawn_sweeper(
            registry.clone(),
            config.interactive.sweep_interval(),
            cancel.child_token(),
        );

        info!(
            data_dir = %data_dir.display(),
            sweep_interval_secs = config.interactive.sweep_interval_secs,
            "Guildhall runtime started"
        );

        Ok(Self {
            config,
            data_dir,
            diagnostics,
            registry,
            cancel,
            sweeper: Some(sweeper),
        })
    }

    /// The configuration the runtime was started with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Root directory of all stores.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The interactive registry. Feed platform reactions to
    /// [`InteractiveRegistry::handle_event`].
    #[must_use]
    pub fn registry(&self) -> &InteractiveRegistry {
        &self.registry
    }

    /// Handler, hook and storage failures. Subscribe to forward them to an
    /// operator.
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticBus {
        &self.diagnostics
    }

    /// A message builder preset with the configured default expiration.
    pub fn message(
        &self,
        message_id: MessageId,
        channel_id: ChannelId,
        guild_id: GuildId,
    ) -> InteractiveMessageBuilder {
        InteractiveMessage::builder(message_id, channel_id, guild_id)
            .expiration(config_bridge::default_expiration(&self.config))
    }

    /// Open and load the store `name` under the data directory.
    ///
    /// A store whose counter file is missing starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidStoreName`] unless `name` is a single
    /// plain path segment, or a storage error if the directory cannot be
    /// created.
    pub async fn open_store<T: PageStorable>(&self, name: &str) -> RuntimeResult<PagedStore<T>> {
        if !is_plain_segment(name) {
            return Err(RuntimeError::InvalidStoreName {
                name: name.to_string(),
            });
        }

        let store = PagedStore::open(
            self.data_dir.join(name),
            self.config.storage.page_size,
            Arc::new(self.diagnostics.clone()),
        )
        .await?;

        if store.initial_load().await {
            debug!(store = name, entries = store.len().await, "Opened store");
        } else {
            info!(store = name, "Starting empty store");
        }
        Ok(store)
    }

    /// Stop the sweeper, wait for it, and unregister every message without
    /// running expiration hooks.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::SweeperFailed`] if the sweeper task panicked.
    pub async fn shutdown(mut self) -> RuntimeResult<()> {
        self.cancel.cancel();
        let joined = match self.sweeper.take() {
            Some(handle) => handle.await,
            None => Ok(()),
        };
        self.registry.clear().await;

        match joined {
            Ok(()) => {
                info!("Guildhall runtime stopped");
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "Sweeper ended abnormally");
                Err(RuntimeError::SweeperFailed(e.to_string()))
            },
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

/// Whether `name` is one normal path component.
fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
