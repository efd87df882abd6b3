//! Note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and persistence.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard removal; no tombstones are kept.

pub mod note;
