//! List card projection.
//!
//! Rules:
//! - `display_title`: trimmed title, else first non-blank content line,
//!   else `UNTITLED_LABEL`.
//! - `preview`: markdown symbols removed, whitespace collapsed, first
//!   `PREVIEW_MAX_CHARS` chars retained.

use crate::model::note::{Note, NoteColor, NoteId, Timestamp};
use once_cell::sync::Lazy;
use regex::Regex;

pub const UNTITLED_LABEL: &str = "Untitled";
pub const PREVIEW_MAX_CHARS: usize = 100;
const TITLE_MAX_CHARS: usize = 60;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\[\]]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Render-ready list entry for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteId,
    pub display_title: String,
    /// `None` when the content has no visible text.
    pub preview: Option<String>,
    pub color: NoteColor,
    pub pinned: bool,
    pub updated_at: Timestamp,
    pub is_active: bool,
}

impl NoteCard {
    pub fn from_note(note: &Note, active_id: Option<&NoteId>) -> Self {
        Self {
            id: note.id.clone(),
            display_title: display_title(note),
            preview: derive_preview(&note.content),
            color: note.color,
            pinned: note.pinned,
            updated_at: note.updated_at,
            is_active: active_id == Some(&note.id),
        }
    }
}

pub fn display_title(note: &Note) -> String {
    let title = note.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    note.content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(derive_preview)
        .map(|line| truncate_chars(&line, TITLE_MAX_CHARS))
        .unwrap_or_else(|| UNTITLED_LABEL.to_string())
}

pub fn derive_preview(content: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, PREVIEW_MAX_CHARS))
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
