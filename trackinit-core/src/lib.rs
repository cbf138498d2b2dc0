//! trackinit-core: Gated track initiation for sensor measurement streams.
//!
//! No async, no I/O beyond the config file: just association and track
//! lifecycle logic. This crate is the shared core used by the `trackinit`
//! CLI and by anything else that feeds measurements in timestamp order.

pub mod config;
pub mod geometry;
pub mod ids;
pub mod ingest;
pub mod store;
pub mod tracker;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{GatingParams, InitiationMode};
pub use ids::{IdPool, IdSlot, SlotState};
pub use store::{Track, TrackStore};
pub use tracker::{associate, Tracker, TrackerState, TrackEvent, TrackSnapshot};
pub use types::*;
