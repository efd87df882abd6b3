use super::{SlotStorage, StorageResult};
use std::collections::HashMap;

/// In-process slot storage; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStorage {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one slot, e.g. with data written by an earlier session.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut storage = Self::default();
        storage.slots.insert(key.into(), value.into());
        storage
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
