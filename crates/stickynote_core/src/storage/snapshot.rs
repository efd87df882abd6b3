//! JSON snapshot codec for the persisted note array.
//!
//! # Invariants
//! - Encoding writes the full array in store order.
//! - Decoding never fails: malformed input yields an empty store.
//! - Decoded output holds at most one note per id (first occurrence wins).

use crate::model::note::Note;
use serde_json::Value;
use std::collections::HashSet;

/// Result of reading the persisted slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Slot absent or blank.
    Empty,
    /// Slot held something other than a JSON array.
    Malformed { reason: String },
    /// Slot held an array; `dropped` counts elements that were skipped.
    Loaded { notes: Vec<Note>, dropped: usize },
}

impl LoadOutcome {
    pub fn into_notes(self) -> Vec<Note> {
        match self {
            Self::Loaded { notes, .. } => notes,
            Self::Empty | Self::Malformed { .. } => Vec::new(),
        }
    }
}

/// Serializes the whole store as a JSON array.
pub fn encode_notes(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Parses raw slot content into notes.
pub fn decode_notes(raw: Option<&str>) -> LoadOutcome {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return LoadOutcome::Empty;
    };

    let elements = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(elements)) => elements,
        Ok(other) => {
            return LoadOutcome::Malformed {
                reason: format!("expected array, found {}", json_kind(&other)),
            }
        }
        Err(err) => {
            return LoadOutcome::Malformed {
                reason: err.to_string(),
            }
        }
    };

    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(elements.len());
    let mut dropped = 0;
    for element in elements {
        match serde_json::from_value::<Note>(element) {
            Ok(note) if seen.insert(note.id.clone()) => notes.push(note),
            _ => dropped += 1,
        }
    }

    LoadOutcome::Loaded { notes, dropped }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
