//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.guildhall/config.toml` (user)
//! 3. Merge the explicitly requested file, if any
//! 4. Apply `GUILDHALL_*` fallbacks for fields no file set
//! 5. Deserialize the merged tree → `Config`
//! 6. Validate

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration with layered file precedence.
///
/// `explicit` is a file the caller asked for by path; it must exist.
/// `home_override` replaces the `~/.guildhall` directory for user-level
/// discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is unreadable or malformed,
/// or if the merged configuration fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(explicit, home_override, &collect_env_vars())
}

pub(crate) fn load_with_env(
    explicit: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<Config> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut set_by_files = HashSet::new();

    // 2. User config.
    match user_config_dir(home_override) {
        Some(dir) => {
            let path = dir.join("config.toml");
            if let Some(overlay) = try_load_file(&path)? {
                merge_layer(&mut merged, &overlay, "", &mut set_by_files);
                info!(path = %path.display(), "loaded user config");
            }
        },
        None => debug!("no home directory; skipping user config"),
    }

    // 3. Explicit file.
    if let Some(path) = explicit {
        let overlay = read_file(path)?;
        merge_layer(&mut merged, &overlay, "", &mut set_by_files);
        info!(path = %path.display(), "loaded config file");
    }

    // 4. Env fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &set_by_files, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;
    Ok(config)
}

/// Load a config from a specific file path (no layering).
///
/// Missing fields take their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let config: Config = read_file(path)?
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// `~/.guildhall`, or the override.
fn user_config_dir(home_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = home_override {
        return Some(dir.to_path_buf());
    }
    directories::BaseDirs::new().map(|d| d.home_dir().join(".guildhall"))
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match read_file(path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if u64::try_from(content.len()).unwrap_or(u64::MAX) > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Deep-merge `overlay` into `base`, recording every leaf field it sets.
///
/// Tables merge per key; scalars and arrays replace.
fn merge_layer(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    set: &mut HashSet<String>,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match base_table.get_mut(key) {
                    Some(base_val) if overlay_val.is_table() => {
                        merge_layer(base_val, overlay_val, &path, set);
                    },
                    Some(base_val) => {
                        *base_val = overlay_val.clone();
                        set.insert(path);
                    },
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, set);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            set.insert(prefix.to_owned());
        },
    }
}

fn record_leaves(value: &toml::Value, prefix: &str, set: &mut HashSet<String>) {
    if let toml::Value::Table(table) = value {
        for (key, child) in table {
            record_leaves(child, &format!("{prefix}.{key}"), set);
        }
    } else {
        set.insert(prefix.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_with_no_files_uses_defaults() {
        let home = TempDir::new().unwrap();
        let config = load_with_env(None, Some(home.path()), &HashMap::new()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn user_file_overrides_defaults() {
        let home = TempDir::new().unwrap();
        write(
            home.path(),
            "config.toml",
            "[storage]\npage_size = 32\n[logging]\nformat = \"json\"\n",
        );

        let config = load_with_env(None, Some(home.path()), &HashMap::new()).unwrap();

        assert_eq!(config.storage.page_size, 32);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.interactive.sweep_interval_secs, 30);
    }

    #[test]
    fn explicit_file_overrides_user_file() {
        let home = TempDir::new().unwrap();
        write(home.path(), "config.toml", "[storage]\npage_size = 32\n");
        let explicit = write(home.path(), "bot.toml", "[storage]\npage_size = 16\n");

        let config =
            load_with_env(Some(&explicit), Some(home.path()), &HashMap::new()).unwrap();

        assert_eq!(config.storage.page_size, 16);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let home = TempDir::new().unwrap();
        let missing = home.path().join("nope.toml");
        let result = load_with_env(Some(&missing), Some(home.path()), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn env_fills_only_fields_files_left_unset() {
        let home = TempDir::new().unwrap();
        write(home.path(), "config.toml", "[logging]\nlevel = \"warn\"\n");
        let env: HashMap<String, String> = [
            ("GUILDHALL_LOG_LEVEL".to_owned(), "trace".to_owned()),
            ("GUILDHALL_DATA_DIR".to_owned(), "/srv/guildhall".to_owned()),
        ]
        .into_iter()
        .collect();

        let config = load_with_env(None, Some(home.path()), &env).unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/srv/guildhall"))
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let home = TempDir::new().unwrap();
        write(home.path(), "config.toml", "[storage\npage_size = ");
        let result = load_with_env(None, Some(home.path()), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let home = TempDir::new().unwrap();
        write(home.path(), "config.toml", "[interactive]\nsweep_interval_secs = 0\n");
        let result = load_with_env(None, Some(home.path()), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn load_file_skips_layering() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "only.toml", "[storage]\npage_size = 8\n");

        let config = load_file(&path).unwrap();

        assert_eq!(config.storage.page_size, 8);
        assert_eq!(config.logging, crate::LoggingSection::default());
    }

    #[test]
    fn merge_records_leaf_paths() {
        let mut base: toml::Value = toml::from_str(DEFAULTS_TOML).unwrap();
        let overlay: toml::Value =
            toml::from_str("[storage]\ndata_dir = \"/tmp/x\"\n[logging]\nlevel = \"debug\"\n")
                .unwrap();
        let mut set = HashSet::new();

        merge_layer(&mut base, &overlay, "", &mut set);

        assert!(set.contains("storage.data_dir"));
        assert!(set.contains("logging.level"));
        assert!(!set.contains("storage.page_size"));
    }
}
