//! Bridge from `guildhall_config::Config` to domain types.
//!
//! The config crate has no dependencies on other Guildhall crates. This
//! module translates its plain values into the types the engine and logging
//! use, in one place.

use guildhall_config::Config;
use guildhall_interactive::Expiration;
use guildhall_telemetry::LogConfig;

use crate::error::RuntimeResult;

/// Convert the `[logging]` section to a [`LogConfig`].
///
/// # Errors
///
/// Returns an error for an unknown log format.
pub fn to_log_config(cfg: &Config) -> RuntimeResult<LogConfig> {
    Ok(LogConfig::from_section(&cfg.logging)?)
}

/// The expiration given to interactive messages that do not choose one.
#[must_use]
pub fn default_expiration(cfg: &Config) -> Expiration {
    cfg.interactive
        .default_ttl()
        .map_or(Expiration::Never, Expiration::after)
}

/// Install the global subscriber described by the `[logging]` section.
///
/// # Errors
///
/// Returns an error if the section is invalid or a subscriber is already
/// installed.
pub fn init_logging(cfg: &Config) -> RuntimeResult<guildhall_telemetry::LoggingGuard> {
    let log_config = to_log_config(cfg)?;
    Ok(guildhall_telemetry::setup_logging(&log_config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildhall_telemetry::LogFormat;

    #[test]
    fn log_config_follows_logging_section() {
        let mut cfg = Config::default();
        cfg.logging.level = "debug".to_owned();
        cfg.logging.format = "json".to_owned();

        let log = to_log_config(&cfg).unwrap();

        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut cfg = Config::default();
        cfg.logging.format = "xml".to_owned();
        assert!(to_log_config(&cfg).is_err());
    }

    #[test]
    fn zero_ttl_never_expires() {
        let mut cfg = Config::default();
        cfg.interactive.default_ttl_secs = 0;
        assert_eq!(default_expiration(&cfg), Expiration::Never);

        cfg.interactive.default_ttl_secs = 60;
        assert!(matches!(default_expiration(&cfg), Expiration::At(_)));
    }
}
