//! Core domain logic for StickyNote.
//! This crate is the single source of truth for note invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{Note, NoteColor, NoteId, NotePatch, Timestamp, UnknownColor};
pub use storage::{
    MemorySlotStorage, SlotStorage, SqliteSlotStorage, StorageError, StorageResult,
    DEFAULT_STORAGE_KEY,
};
pub use store::NoteStore;
pub use view::{visible_notes, NoteCard, StoreSummary};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
