//! Reconnection supervisor.
//!
//! Counts ticks on which the session yielded nothing, at most one count
//! per `failure_interval`. Past `failure_threshold` counts it asks for a
//! reconnect and starts over. With the defaults a silent connection is
//! replaced after roughly ten seconds, and a dead server is retried at
//! that same pace rather than on every tick.

use tokio::time::Instant;
use tracing::trace;

use crate::config::SupervisorConfig;

/// What the controller should do after this tick's poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A line arrived; the connection is alive.
    Healthy,
    /// Nothing arrived; keep waiting.
    Waiting,
    /// Too many silent polls; reopen and resubscribe now.
    Reconnect,
}

/// Observable snapshot of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    pub is_open: bool,
    pub consecutive_failures: u32,
    pub last_failure: Option<Instant>,
}

#[derive(Debug)]
pub struct Supervisor {
    config: SupervisorConfig,
    failures: u32,
    last_failure: Option<Instant>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            failures: 0,
            last_failure: None,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    pub fn last_failure(&self) -> Option<Instant> {
        self.last_failure
    }

    /// The session yielded a line this tick.
    pub fn record_line(&mut self) -> Verdict {
        self.failures = 0;
        Verdict::Healthy
    }

    /// The session yielded nothing this tick.
    pub fn record_silence(&mut self, now: Instant) -> Verdict {
        let due = self.last_failure.is_none_or(|at| {
            now.saturating_duration_since(at) >= self.config.failure_interval
        });

        if due {
            self.failures += 1;
            self.last_failure = Some(now);
            trace!(failures = self.failures, "silent poll counted");
        }

        if self.failures > self.config.failure_threshold {
            self.failures = 0;
            return Verdict::Reconnect;
        }

        Verdict::Waiting
    }

    /// Start counting from zero, e.g. after an out-of-band reconnect.
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
