//! Request paths and event-stream frame decoding.
//!
//! The server speaks a small trusted subset of server-sent events: one
//! `data: <json>` line per event. Only `{"type":"poke", ...}` carries an
//! instruction; every other type is surfaced as [`StreamEvent::Other`] so
//! callers can count it as liveness without acting on it.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// Largest JSON payload accepted after the `data:` prefix.
pub const MAX_PAYLOAD_BYTES: usize = 1024;

/// Largest raw line the framer will assemble.
pub const MAX_LINE_BYTES: usize = 2048;

const DATA_PREFIX: &str = "data:";
const POKE_TYPE: &str = "poke";

// ── Paths ────────────────────────────────────────────────────────────

/// Long-lived subscription path for a device.
pub fn stream_path(api_key: &str) -> String {
    format!("/api/device/{api_key}/poke/stream")
}

/// Fire-and-forget trigger path for a device.
pub fn poke_path(api_key: &str) -> String {
    format!("/api/device/{api_key}/poke")
}

// ── Events ───────────────────────────────────────────────────────────

/// An actionable poke.
#[derive(Debug, Clone, PartialEq)]
pub struct PokeEvent {
    /// How long the pushed state stays before the saved preset returns.
    pub sustain: Duration,

    /// Host-defined state document to apply. `Null` when absent.
    pub state: serde_json::Value,
}

/// A decoded `data:` frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Poke(PokeEvent),
    /// Any other event type (heartbeats, announcements).
    Other { kind: String },
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type", default)]
    kind: String,

    #[serde(rename = "sustainS", default)]
    sustain_secs: f64,

    #[serde(default)]
    state: serde_json::Value,
}

/// Decode one stream line.
///
/// Returns `None` for lines without the `data:` prefix, for payloads over
/// [`MAX_PAYLOAD_BYTES`], and for payloads that are not a JSON object of
/// the expected shape. None of these are errors.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();

    if payload.len() > MAX_PAYLOAD_BYTES {
        debug!(len = payload.len(), "dropping oversized event payload");
        return None;
    }

    let frame: RawFrame = match serde_json::from_str(payload) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "dropping malformed event payload");
            return None;
        }
    };

    if frame.kind != POKE_TYPE {
        return Some(StreamEvent::Other { kind: frame.kind });
    }

    Some(StreamEvent::Poke(PokeEvent {
        sustain: sustain_from_secs(frame.sustain_secs),
        state: frame.state,
    }))
}

/// Negative and non-finite values mean "restore now"; values too large
/// for a `Duration` saturate.
fn sustain_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
