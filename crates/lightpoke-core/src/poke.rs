//! Poke protocol handler.
//!
//! Owns the single sustain window. Accepting a poke snapshots the current
//! state into the reserved preset (unless a window is already open),
//! schedules the pushed state for the next tick, and after the sustain
//! duration brings the preset back.
//!
//! A poke that lands inside an open window replaces the pushed state and
//! restarts the timer without saving again, so the restore target stays
//! the state from before the first poke.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use lightpoke_api::protocol::{self, PokeEvent, StreamEvent};

use crate::config::RESTORE_PRESET_LABEL;
use crate::host::Host;

/// The transient override window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPoke {
    pub sustain: Duration,
    /// `None` when no window is open.
    pub activated_at: Option<Instant>,
    pub pushed_state: serde_json::Value,
    override_due: bool,
}

impl PendingPoke {
    pub fn is_active(&self) -> bool {
        self.activated_at.is_some()
    }

    /// `true` between acceptance and the tick that applies the override.
    pub fn override_due(&self) -> bool {
        self.override_due
    }
}

/// What a stream line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a decodable `data:` frame.
    Ignored,
    /// A well-formed event of another type.
    Other(String),
    /// A poke was accepted.
    Accepted,
    /// A poke was dropped because the restore preset could not be saved.
    Refused,
}

#[derive(Debug)]
pub struct PokeHandler {
    preset_id: u8,
    pending: PendingPoke,
}

impl PokeHandler {
    pub fn new(preset_id: u8) -> Self {
        Self {
            preset_id,
            pending: PendingPoke::default(),
        }
    }

    pub fn pending(&self) -> &PendingPoke {
        &self.pending
    }

    pub fn preset_id(&self) -> u8 {
        self.preset_id
    }

    /// Handle one stream line.
    pub async fn on_line<H: Host>(&mut self, line: &str, now: Instant, host: &mut H) -> LineOutcome {
        match protocol::decode_line(line) {
            Some(StreamEvent::Poke(poke)) => self.on_poke(poke, now, host).await,
            Some(StreamEvent::Other { kind }) => {
                debug!(kind = %kind, "ignoring non-poke event");
                LineOutcome::Other(kind)
            }
            None => LineOutcome::Ignored,
        }
    }

    /// Accept a decoded poke.
    pub async fn on_poke<H: Host>(
        &mut self,
        poke: PokeEvent,
        now: Instant,
        host: &mut H,
    ) -> LineOutcome {
        if self.pending.is_active() {
            debug!("poke during open window, replacing it without a new snapshot");
        } else {
            if let Err(e) = host.save_preset(self.preset_id, RESTORE_PRESET_LABEL).await {
                warn!(error = %e, preset = self.preset_id, "could not save restore preset, dropping poke");
                return LineOutcome::Refused;
            }
            host.invalidate_preset_cache();
        }

        info!(
            sustain_ms = u64::try_from(poke.sustain.as_millis()).unwrap_or(u64::MAX),
            "poke accepted"
        );

        self.pending.sustain = poke.sustain;
        self.pending.activated_at = Some(now);
        self.pending.pushed_state = poke.state;
        self.pending.override_due = true;

        LineOutcome::Accepted
    }

    /// Per-tick housekeeping: apply a due override, or end an expired
    /// window by restoring the preset.
    pub async fn service<H: Host>(&mut self, now: Instant, host: &mut H) {
        if self.pending.override_due {
            self.pending.override_due = false;
            if !self.pending.pushed_state.is_null() {
                if let Err(e) = host.apply_state(&self.pending.pushed_state).await {
                    warn!(error = %e, "applying poke state failed");
                }
            }
            return;
        }

        let Some(activated_at) = self.pending.activated_at else {
            return;
        };
        if now.saturating_duration_since(activated_at) < self.pending.sustain {
            return;
        }

        if let Err(e) = host.apply_preset(self.preset_id).await {
            warn!(error = %e, preset = self.preset_id, "restoring preset failed");
        }
        self.pending = PendingPoke::default();
        info!(preset = self.preset_id, "poke window ended, preset restored");
    }
}
