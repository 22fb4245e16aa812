//! Server URL decomposition and the allow-list policy.
//!
//! The parser is deliberately forgiving: it assumes a string that already
//! passed [`is_valid_server_url`] and never signals errors. A port it
//! cannot read comes back as `0`, which the session refuses to open.

use std::fmt;

use tracing::warn;
use url::Url;

use crate::error::Error;

/// Compiled-in fallback for any rejected server URL.
pub const DEFAULT_SERVER_URL: &str = "http://192.168.0.150:3000";

/// Canonical hosted server, TLS.
pub const CANONICAL_SECURE_URL: &str = "https://api.lightpoke.io";

/// Canonical hosted server, plaintext.
pub const CANONICAL_INSECURE_URL: &str = "http://api.lightpoke.io";

const SECURE_PREFIX: &str = "https://";
const INSECURE_PREFIX: &str = "http://";

/// Host prefixes accepted for plaintext LAN servers.
const PRIVATE_HOST_PREFIXES: [&str; 2] = ["192.168.", "10."];

// ── Scheme ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Secure,
    Insecure,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secure => "https",
            Self::Insecure => "http",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Secure => 443,
            Self::Insecure => 80,
        }
    }
}

// ── ServerEndpoint ───────────────────────────────────────────────────

/// Where the poke server lives, derived from the configured URL.
///
/// Recomputed whenever the server URL changes; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    /// Split `scheme://host[:port][/path]` into its parts.
    ///
    /// Anything after the first `/` following the authority is dropped.
    /// Without an explicit port the scheme default applies.
    pub fn parse(url: &str) -> Self {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix(SECURE_PREFIX) {
            (Scheme::Secure, rest)
        } else if let Some(rest) = url.strip_prefix(INSECURE_PREFIX) {
            (Scheme::Insecure, rest)
        } else {
            (Scheme::Insecure, url)
        };

        let authority = rest.split_once('/').map_or(rest, |(authority, _)| authority);

        match authority.split_once(':') {
            Some((host, port)) => Self {
                scheme,
                host: host.to_owned(),
                port: parse_port(port),
            },
            None => Self {
                scheme,
                host: authority.to_owned(),
                port: scheme.default_port(),
            },
        }
    }

    /// `true` if the session can attempt a connection at all.
    pub fn is_connectable(&self) -> bool {
        self.port != 0 && !self.host.is_empty()
    }

    /// Build a request URL for `path` on this endpoint.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = Url::parse(&self.to_string())?;
        Ok(base.join(path)?)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

/// Leading decimal digits as a port; anything unreadable is `0`.
fn parse_port(raw: &str) -> u16 {
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw.get(..end)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

// ── Validation ───────────────────────────────────────────────────────

/// Allow-list check for a candidate server URL.
///
/// Accepts the canonical hosted pair verbatim, or a plaintext URL whose
/// host sits in `192.168.*` or `10.*`. A TLS URL on a private address is
/// rejected.
pub fn is_valid_server_url(candidate: &str) -> bool {
    if candidate == CANONICAL_SECURE_URL || candidate == CANONICAL_INSECURE_URL {
        return true;
    }
    if !candidate.starts_with(INSECURE_PREFIX) {
        return false;
    }

    let endpoint = ServerEndpoint::parse(candidate);
    PRIVATE_HOST_PREFIXES
        .iter()
        .any(|prefix| endpoint.host.starts_with(prefix))
}

/// Return `candidate` if it passes the allow-list, else the default.
pub fn sanitize_server_url(candidate: &str) -> String {
    if is_valid_server_url(candidate) {
        candidate.to_owned()
    } else {
        warn!(
            rejected = candidate,
            fallback = DEFAULT_SERVER_URL,
            "server URL not allowed, using default"
        );
        DEFAULT_SERVER_URL.to_owned()
    }
}
