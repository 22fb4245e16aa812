//! Configuration for the LightPoke bridge.
//!
//! One TOML file (platform config dir, or an explicit path) merged with
//! `LIGHTPOKE_`-prefixed environment variables, then translated into the
//! runtime types the core and API crates consume.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use lightpoke_api::DEFAULT_SERVER_URL;
use lightpoke_api::sanitize_server_url;
use lightpoke_api::transport::{TlsMode, TransportConfig};
use lightpoke_core::{ClientConfig, DEFAULT_RESTORE_PRESET_ID, SupervisorConfig, Tuning};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub device: DeviceSection,

    #[serde(default)]
    pub tuning: TuningSection,
}

/// The poke server subscription.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: String,

    /// Must be one of the canonical servers or a private-LAN address.
    #[serde(default = "default_server")]
    pub server: String,

    /// Accept self-signed certificates from the poke server.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            server: default_server(),
            insecure: false,
        }
    }
}

/// The LED device whose JSON API receives presets and state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceSection {
    #[serde(default = "default_device_url")]
    pub url: String,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            url: default_device_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TuningSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_failure_interval_ms")]
    pub failure_interval_ms: u64,

    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_preset_id")]
    pub preset_id: u8,
}

impl Default for TuningSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            failure_interval_ms: default_failure_interval_ms(),
            failure_threshold: default_failure_threshold(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            preset_id: default_preset_id(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_server() -> String {
    DEFAULT_SERVER_URL.into()
}
fn default_device_url() -> String {
    "http://127.0.0.1".into()
}
fn default_tick_interval_ms() -> u64 {
    50
}
fn default_failure_interval_ms() -> u64 {
    1000
}
fn default_failure_threshold() -> u32 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_preset_id() -> u8 {
    DEFAULT_RESTORE_PRESET_ID
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "lightpoke", "lightpoke").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lightpoke");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LIGHTPOKE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to runtime types ────────────────────────────────────

/// Everything the bridge needs to run, validated.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub client: ClientConfig,
    pub tuning: Tuning,
    pub transport: TransportConfig,
    pub device_url: url::Url,
    pub tick_interval: Duration,
}

impl Config {
    /// Client settings. An untrusted server falls back to the default.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            enabled: self.client.enabled,
            api_key: self.client.api_key.clone(),
            server_url: sanitize_server_url(&self.client.server),
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            supervisor: SupervisorConfig {
                failure_interval: Duration::from_millis(self.tuning.failure_interval_ms),
                failure_threshold: self.tuning.failure_threshold,
            },
            restore_preset_id: self.tuning.preset_id,
            session_timeout: Duration::from_secs(
                self.tuning
                    .connect_timeout_secs
                    .saturating_add(self.tuning.request_timeout_secs),
            ),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: if self.client.insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            connect_timeout: Duration::from_secs(self.tuning.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.tuning.request_timeout_secs),
        }
    }

    pub fn device_url(&self) -> Result<url::Url, ConfigError> {
        let url: url::Url = self.device.url.parse().map_err(|_| ConfigError::Validation {
            field: "device.url".into(),
            reason: format!("invalid URL: {}", self.device.url),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Validation {
                field: "device.url".into(),
                reason: format!("expected http or https, got '{other}'"),
            }),
        }
    }

    /// Validate and translate the whole file.
    pub fn resolve(&self) -> Result<RuntimeConfig, ConfigError> {
        if self.tuning.tick_interval_ms == 0 {
            return Err(ConfigError::Validation {
                field: "tuning.tick_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.tuning.connect_timeout_secs == 0 || self.tuning.request_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "tuning".into(),
                reason: "timeouts must be greater than zero".into(),
            });
        }

        Ok(RuntimeConfig {
            client: self.client_config(),
            tuning: self.tuning(),
            transport: self.transport(),
            device_url: self.device_url()?,
            tick_interval: Duration::from_millis(self.tuning.tick_interval_ms),
        })
    }
}
