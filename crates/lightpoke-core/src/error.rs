// ── Core error types ──
//
// Nothing in this crate is fatal to the host. These errors exist so that
// failures can be logged with a consistent shape; the controller never
// propagates them out of a tick.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach poke server at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Poke server rejected {path} with HTTP {status}")]
    Rejected { status: u16, path: String },

    #[error("Poke session is not open")]
    NotConnected,

    // ── Host collaborator errors ─────────────────────────────────────
    #[error("Host operation failed: {message}")]
    Host { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Shorthand for host adapters.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lightpoke_api::Error> for CoreError {
    fn from(err: lightpoke_api::Error) -> Self {
        match err {
            lightpoke_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                endpoint: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            lightpoke_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lightpoke_api::Error::Tls(message) => CoreError::ConnectionFailed {
                endpoint: String::new(),
                reason: format!("TLS error: {message}"),
            },
            lightpoke_api::Error::InvalidEndpoint { endpoint } => CoreError::Config {
                message: format!("server endpoint {endpoint} has no usable host/port"),
            },
            lightpoke_api::Error::Timeout { path, after } => CoreError::ConnectionFailed {
                endpoint: path,
                reason: format!("no response within {after:?}"),
            },
            lightpoke_api::Error::NotConnected => CoreError::NotConnected,
            lightpoke_api::Error::Status { status, path } => CoreError::Rejected { status, path },
        }
    }
}
