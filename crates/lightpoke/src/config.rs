//! CLI-aware wrappers around lightpoke-config.
//!
//! Resolves the config file from `--config` / `LIGHTPOKE_CONFIG` before
//! falling back to the platform path, and layers command-line overrides
//! on top of the loaded file.

use std::path::PathBuf;

use lightpoke_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file this invocation reads and writes.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(lightpoke_config::config_path)
}

/// Load the file + environment for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(lightpoke_config::load_config_from(&config_file(global))?)
}

/// Apply a `--api-key` override and require a non-empty key.
pub fn require_api_key(
    cfg: &mut Config,
    global: &GlobalOpts,
    api_key: Option<String>,
) -> Result<(), CliError> {
    if let Some(key) = api_key {
        cfg.client.api_key = key;
    }
    if cfg.client.api_key.is_empty() {
        return Err(CliError::NoApiKey {
            path: config_file(global).display().to_string(),
        });
    }
    Ok(())
}
