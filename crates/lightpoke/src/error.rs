//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use lightpoke_config::ConfigError;
use lightpoke_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to poke server at {url}")]
    #[diagnostic(
        code(lightpoke::connection_failed),
        help(
            "Check that the server is running and reachable from this host.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Poke server rejected {path} with HTTP {status}")]
    #[diagnostic(
        code(lightpoke::rejected),
        help("Verify the device API key with: lightpoke config show")
    )]
    Rejected { status: u16, path: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("LED controller request failed: {message}")]
    #[diagnostic(code(lightpoke::device))]
    Device { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Server URL '{url}' is not accepted")]
    #[diagnostic(
        code(lightpoke::untrusted_server),
        help(
            "Use https://api.lightpoke.io, http://api.lightpoke.io, or a\n\
             private LAN address (http://192.168.x.x or http://10.x.x.x)."
        )
    )]
    UntrustedServer { url: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lightpoke::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No API key configured")]
    #[diagnostic(
        code(lightpoke::no_api_key),
        help(
            "Set [client] api_key in {path}, pass --api-key,\n\
             or set LIGHTPOKE_CLIENT__API_KEY."
        )
    )]
    NoApiKey { path: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(lightpoke::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(lightpoke::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render config: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Device { .. } => exit_code::CONNECTION,
            Self::UntrustedServer { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::NoApiKey { .. } | Self::Config(_) => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { endpoint, reason } => CliError::ConnectionFailed {
                url: endpoint,
                source: reason.into(),
            },

            CoreError::NotConnected => CliError::ConnectionFailed {
                url: "(not connected)".into(),
                source: "Poke session was not open".into(),
            },

            CoreError::Rejected { status, path } => CliError::Rejected { status, path },

            CoreError::Host { message } => CliError::Device { message },

            CoreError::Config { message } => CliError::Validation {
                field: "server".into(),
                reason: message,
            },
        }
    }
}

impl From<lightpoke_api::Error> for CliError {
    fn from(err: lightpoke_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
