//! SQLite-backed slot storage.
//!
//! # Invariants
//! - The wrapped connection has migrations applied (`local_storage` exists).
//! - `write` is a single-statement upsert.

use super::{SlotStorage, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Slot storage persisted in the `local_storage` table.
pub struct SqliteSlotStorage {
    conn: Connection,
}

impl SqliteSlotStorage {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - Returns `StorageError::Unavailable` when the schema is missing.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        ensure_slot_table(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) a storage file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SlotStorage for SqliteSlotStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

fn ensure_slot_table(conn: &Connection) -> StorageResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'local_storage'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StorageError::Unavailable(
            "local_storage table missing; open the connection through db::open_db".to_string(),
        ))
    }
}
