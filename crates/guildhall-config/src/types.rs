//! Configuration types.
//!
//! Every struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header produces a working configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Paged store location and shape.
    pub storage: StorageSection,
    /// Interactive message lifetimes.
    pub interactive: InteractiveSection,
    /// Logging and tracing.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Where and how paged stores are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Root directory for stores. `None` uses the platform data directory
    /// (e.g. `$XDG_DATA_HOME/guildhall`).
    pub data_dir: Option<PathBuf>,
    /// Entries per page file.
    pub page_size: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            page_size: 64,
        }
    }
}

impl StorageSection {
    /// The configured data directory, or the platform default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no directory is configured and
    /// the platform default cannot be determined.
    pub fn resolve_data_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("", "", "guildhall")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoHomeDir)
    }
}

// ---------------------------------------------------------------------------
// InteractiveSection
// ---------------------------------------------------------------------------

/// Interactive message timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveSection {
    /// Seconds between expiry sweeps.
    pub sweep_interval_secs: u64,
    /// Default lifetime for new interactive messages, in seconds. `0` means
    /// no expiry.
    pub default_ttl_secs: u64,
}

impl Default for InteractiveSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            default_ttl_secs: 900,
        }
    }
}

impl InteractiveSection {
    /// [`sweep_interval_secs`](Self::sweep_interval_secs) as a `Duration`.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// [`default_ttl_secs`](Self::default_ttl_secs) as a `Duration`, or
    /// `None` when messages should not expire by default.
    #[must_use]
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl_secs > 0).then(|| Duration::from_secs(self.default_ttl_secs))
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["guildhall_storage=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_sections_use_defaults() {
        let config: Config = toml::from_str("[storage]\n[interactive]\n[logging]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let section = StorageSection {
            data_dir: Some(PathBuf::from("/srv/guildhall")),
            ..StorageSection::default()
        };
        assert_eq!(
            section.resolve_data_dir().unwrap(),
            PathBuf::from("/srv/guildhall")
        );
    }

    #[test]
    fn zero_ttl_means_no_expiry() {
        let section = InteractiveSection {
            default_ttl_secs: 0,
            ..InteractiveSection::default()
        };
        assert_eq!(section.default_ttl(), None);
        assert_eq!(
            InteractiveSection::default().default_ttl(),
            Some(Duration::from_secs(900))
        );
    }
}
