//! Persisted key/value slot holding the serialized note array.
//!
//! # Responsibility
//! - Define the slot contract the store mirrors itself into.
//! - Own the JSON snapshot codec for the note array.
//!
//! # Invariants
//! - One key holds the whole array; writes replace the value atomically.
//! - Unreadable slot content degrades to an empty store, never an error.

mod memory;
pub mod snapshot;
mod sqlite;

pub use memory::MemorySlotStorage;
pub use snapshot::{decode_notes, encode_notes, LoadOutcome};
pub use sqlite::SqliteSlotStorage;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default slot key used when configuration does not override it.
pub const DEFAULT_STORAGE_KEY: &str = "stickynote.notes";

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Encode(serde_json::Error),
    /// Backend refused the operation (quota, read-only medium, ...).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Device-local string slot storage.
pub trait SlotStorage {
    /// Returns the raw value under `key`, or `None` when never written.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value under `key`.
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: SlotStorage + ?Sized> SlotStorage for Box<S> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}
