//! Environment variable fallbacks.
//!
//! A `GUILDHALL_*` variable fills its field only when no config file set it.

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Prefix of every variable this crate reads.
pub const ENV_PREFIX: &str = "GUILDHALL_";

/// Variable name and the dotted config field it falls back for.
const FALLBACKS: &[(&str, &str)] = &[
    ("GUILDHALL_LOG_LEVEL", "logging.level"),
    ("GUILDHALL_DATA_DIR", "storage.data_dir"),
];

/// Snapshot the `GUILDHALL_*` variables of this process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Apply fallbacks for fields not in `set_by_files`. Returns how many were
/// applied.
pub fn apply_env_fallbacks(
    merged: &mut toml::Value,
    set_by_files: &HashSet<String>,
    env: &HashMap<String, String>,
) -> usize {
    let mut applied: usize = 0;
    for (var, field) in FALLBACKS {
        if set_by_files.contains(*field) {
            continue;
        }
        let Some(value) = env.get(*var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        if set_field(merged, field, toml::Value::String(value.trim().to_owned())) {
            debug!(var, field, "applied environment fallback");
            applied = applied.saturating_add(1);
        }
    }
    applied
}

/// Set a `section.key` field, creating the section table if needed.
fn set_field(root: &mut toml::Value, field: &str, value: toml::Value) -> bool {
    let Some((section, key)) = field.split_once('.') else {
        return false;
    };
    let Some(root) = root.as_table_mut() else {
        return false;
    };
    let section = root
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    match section.as_table_mut() {
        Some(table) => {
            table.insert(key.to_owned(), value);
            true
        },
        None => false,
    }
}
