// ── Runtime client configuration ──
//
// What the controller needs to run, independent of where it came from.
// Persistence lives in the host (or in lightpoke-config for the bridge
// binary); the controller only sees these values through its hooks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lightpoke_api::DEFAULT_SERVER_URL;

/// Preset slot reserved for the pre-poke snapshot.
pub const DEFAULT_RESTORE_PRESET_ID: u8 = 249;

/// Label stored alongside the reserved preset.
pub const RESTORE_PRESET_LABEL: &str = "Light Poke Restore";

/// User-facing settings, mirrored into the host's config object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub enabled: bool,
    pub api_key: String,
    /// Always an allow-listed URL once accepted by the controller.
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            server_url: DEFAULT_SERVER_URL.to_owned(),
        }
    }
}

/// Reconnection policy for the [`Supervisor`](crate::Supervisor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Minimum spacing between two counted failed polls.
    pub failure_interval: Duration,
    /// Reconnect once the failure count goes past this.
    pub failure_threshold: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            failure_interval: Duration::from_millis(1000),
            failure_threshold: 10,
        }
    }
}

/// Knobs that are compiled-in constants on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub supervisor: SupervisorConfig,
    pub restore_preset_id: u8,
    /// Upper bound on any single session request awaited from a tick.
    pub session_timeout: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            supervisor: SupervisorConfig::default(),
            restore_preset_id: DEFAULT_RESTORE_PRESET_ID,
            session_timeout: Duration::from_secs(20),
        }
    }
}
