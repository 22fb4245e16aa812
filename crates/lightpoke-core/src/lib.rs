// lightpoke-core: connection supervision and poke/restore orchestration.

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod poke;
pub mod session;
pub mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    ClientConfig, DEFAULT_RESTORE_PRESET_ID, RESTORE_PRESET_LABEL, SupervisorConfig, Tuning,
};
pub use controller::{LightPoke, SECTION};
pub use error::CoreError;
pub use host::Host;
pub use poke::{LineOutcome, PendingPoke, PokeHandler};
pub use session::PokeSession;
pub use supervisor::{ConnectionState, Supervisor, Verdict};
