//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record mirrored to the persisted slot.
//! - Provide the partial-update shape accepted by the store.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `updated_at` never moves backwards for the same note.
//! - Serialized keys are camelCase: `createdAt`, `updatedAt`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one note.
///
/// Generated ids are UUID v4 strings, but any persisted string id is
/// accepted on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// UTC instant with millisecond precision.
///
/// Serialized as RFC 3339 with three fractional digits and a `Z` suffix, so
/// lexical order of the serialized form equals chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wraps an instant, dropping sub-millisecond precision.
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self(value.trunc_subsecs(3))
    }

    /// Builds a timestamp from Unix epoch milliseconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_epoch_ms(epoch_ms: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(epoch_ms).map(Self)
    }

    pub fn epoch_ms(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s.trim())?;
        Ok(Self::from_datetime(parsed.with_timezone(&Utc)))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accent color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Green,
    Blue,
    Pink,
    Purple,
    Orange,
}

impl NoteColor {
    /// Every palette entry, in display order.
    pub const PALETTE: [NoteColor; 6] = [
        NoteColor::Yellow,
        NoteColor::Green,
        NoteColor::Blue,
        NoteColor::Pink,
        NoteColor::Purple,
        NoteColor::Orange,
    ];

    /// Picks one palette entry uniformly at random.
    pub fn random() -> Self {
        let index = rand::rng().random_range(0..Self::PALETTE.len());
        Self::PALETTE[index]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }
}

impl Display for NoteColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown palette name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl Display for UnknownColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown note color `{}`; expected yellow|green|blue|pink|purple|orange",
            self.0
        )
    }
}

impl std::error::Error for UnknownColor {}

impl FromStr for NoteColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::PALETTE
            .into_iter()
            .find(|color| color.as_str() == normalized)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// One user-authored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub pinned: bool,
    pub color: NoteColor,
}

impl Note {
    /// Creates an empty, unpinned note with a random palette color.
    ///
    /// # Invariants
    /// - `created_at == updated_at == now`.
    pub fn blank(now: Timestamp) -> Self {
        Self {
            id: NoteId::generate(),
            title: String::new(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            pinned: false,
            color: NoteColor::random(),
        }
    }

    /// Copies this note under a new id with fresh timestamps.
    ///
    /// The title gets a ` (Copy)` suffix; pin flag and color are kept.
    pub fn duplicate(&self, now: Timestamp) -> Self {
        Self {
            id: NoteId::generate(),
            title: format!("{} (Copy)", self.title),
            content: self.content.clone(),
            created_at: now,
            updated_at: now,
            pinned: self.pinned,
            color: self.color,
        }
    }

    /// Merges the patch fields and advances `updated_at`.
    ///
    /// `updated_at` becomes `max(now, previous)`.
    pub fn apply(&mut self, patch: NotePatch, now: Timestamp) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.updated_at = self.updated_at.max(now);
    }
}

/// Partial field set for `NoteStore::update`.
///
/// `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub pinned: Option<bool>,
    pub color: Option<NoteColor>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn color(mut self, color: NoteColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.pinned.is_none()
            && self.color.is_none()
    }
}
