//! Private key provisioning.
//!
//! Keys never live in the main config file. They are read from an
//! environment variable and/or a keys file, in that order, and kept as
//! redacted `KeyMaterial` until an account is processed.

use std::fs;
use std::path::Path;

use crate::blockchain::wallet::KeyMaterial;
use crate::config::loader::ConfigError;
use crate::config::schema::SweepTargetConfig;

/// Default environment variable holding the source keys.
pub const DEFAULT_KEY_ENV_VAR: &str = "COLLECTOR_PRIVATE_KEYS";

/// Split a blob of keys on commas, whitespace and newlines.
///
/// Lines starting with `#` are comments.
pub fn parse_key_list(blob: &str) -> Vec<KeyMaterial> {
    blob.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(KeyMaterial::new)
        .collect()
}

/// Load the ordered key list for a run.
///
/// Environment keys come first, followed by keys from `keys_file`.
pub fn load_keys(target: &SweepTargetConfig) -> Result<Vec<KeyMaterial>, ConfigError> {
    let mut keys = Vec::new();

    if let Ok(blob) = std::env::var(&target.key_env) {
        keys.extend(parse_key_list(&blob));
    }

    if let Some(path) = &target.keys_file {
        let blob = fs::read_to_string(Path::new(path)).map_err(ConfigError::Io)?;
        keys.extend(parse_key_list(&blob));
    }

    if keys.is_empty() {
        return Err(ConfigError::Keys(format!(
            "no private keys found in ${} or keys_file",
            target.key_env
        )));
    }

    tracing::info!(count = keys.len(), "Loaded source keys");
    Ok(keys)
}
