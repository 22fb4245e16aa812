use thiserror::Error;

/// Top-level error type for the `lightpoke-api` crate.
///
/// Covers every failure of the wire layer: endpoint derivation, the
/// HTTP transport, and the streaming session. `lightpoke-core` maps
/// these into its own variants and never lets them abort a tick.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error while building a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error while building the HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Session ─────────────────────────────────────────────────────
    /// The server URL did not yield a usable host and port.
    #[error("Endpoint {endpoint} is not connectable")]
    InvalidEndpoint { endpoint: String },

    /// A request was issued before [`open`](crate::StreamSession::open).
    #[error("Session is not open")]
    NotConnected,

    /// The server accepted the connection but did not answer in time.
    #[error("No response to {path} within {after:?}")]
    Timeout {
        path: String,
        after: std::time::Duration,
    },

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {status} for {path}")]
    Status { status: u16, path: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next reconnect cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::NotConnected | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
