//! Host firmware collaborators.
//!
//! The controller never renders or persists anything itself. It asks the
//! host to snapshot the current state into a preset, to apply a pushed
//! state, and to bring the preset back. Every apply is notification-class:
//! observers are told about the change, but it is not recorded as a new
//! user preset.

use std::future::Future;

use crate::error::CoreError;

pub trait Host: Send {
    /// `true` while the host is mid-render; the tick is skipped.
    fn is_busy(&self) -> bool {
        false
    }

    /// Snapshot the full current lighting state into preset `id`.
    ///
    /// The host may defer the write until its next loop iteration; the
    /// controller applies the override no earlier than the next tick.
    fn save_preset(
        &mut self,
        id: u8,
        label: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Drop anything cached from preset contents after a save.
    fn invalidate_preset_cache(&mut self) {}

    /// Re-apply preset `id` as a notification-class change.
    fn apply_preset(&mut self, id: u8) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Apply a state document as a notification-class change.
    fn apply_state(
        &mut self,
        state: &serde_json::Value,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}
