//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound on `storage.page_size`.
const MAX_PAGE_SIZE: usize = 100_000;

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_storage(config)?;
    validate_interactive(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    let page_size = config.storage.page_size;
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError {
            field: "storage.page_size".to_owned(),
            message: format!("page size {page_size} is out of range; must be 1..={MAX_PAGE_SIZE}"),
        });
    }

    if config
        .storage
        .data_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        return Err(ConfigError::ValidationError {
            field: "storage.data_dir".to_owned(),
            message: "must not be empty; omit it to use the platform default".to_owned(),
        });
    }

    Ok(())
}

fn validate_interactive(config: &Config) -> ConfigResult<()> {
    if config.interactive.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "interactive.sweep_interval_secs".to_owned(),
            message: "sweep interval must be at least 1 second".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}
