//! Derived, render-ready views over the note store.
//!
//! # Responsibility
//! - Compute the visible note sequence from store state and a search term.
//! - Project notes into list cards for a list/detail UI.
//!
//! # Invariants
//! - Derivation is pure: same notes + term always yield the same order.
//! - Pinned notes always precede unpinned notes.
//! - Within a pin group, newer `updated_at` comes first; ties keep store order.

mod card;

pub use card::{derive_preview, display_title, NoteCard, PREVIEW_MAX_CHARS, UNTITLED_LABEL};

use crate::model::note::Note;
use std::cmp::Ordering;

/// Counts shown alongside the note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSummary {
    pub total: usize,
    pub pinned: usize,
    pub visible: usize,
}

/// Filters and sorts notes for display.
///
/// A blank (after trim) term disables filtering. Otherwise a note matches
/// when its title or content contains the term, ignoring case.
pub fn visible_notes<'a>(notes: &'a [Note], term: &str) -> Vec<&'a Note> {
    let needle = normalize_term(term);
    let mut visible = notes
        .iter()
        .filter(|note| match needle.as_deref() {
            Some(needle) => matches_term(note, needle),
            None => true,
        })
        .collect::<Vec<_>>();
    visible.sort_by(|left, right| display_order(left, right));
    visible
}

/// Builds list summary counts for the given state.
pub fn summarize(notes: &[Note], term: &str) -> StoreSummary {
    StoreSummary {
        total: notes.len(),
        pinned: notes.iter().filter(|note| note.pinned).count(),
        visible: visible_notes(notes, term).len(),
    }
}

/// Total order used for display: pinned first, then newest update first.
pub fn display_order(left: &Note, right: &Note) -> Ordering {
    right
        .pinned
        .cmp(&left.pinned)
        .then_with(|| right.updated_at.cmp(&left.updated_at))
}

fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn matches_term(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{summarize, visible_notes};
    use crate::model::note::{Note, Timestamp};

    fn note(title: &str, content: &str, updated_ms: i64, pinned: bool) -> Note {
        let mut note = Note::blank(Timestamp::from_epoch_ms(0).unwrap());
        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = Timestamp::from_epoch_ms(updated_ms).unwrap();
        note.pinned = pinned;
        note
    }

    fn titles(notes: &[&Note]) -> Vec<String> {
        notes.iter().map(|note| note.title.clone()).collect()
    }

    #[test]
    fn pinned_notes_sort_before_newer_unpinned_notes() {
        let notes = vec![
            note("new", "", 9_000, false),
            note("old-pinned", "", 1_000, true),
            note("mid", "", 5_000, false),
        ];
        assert_eq!(
            titles(&visible_notes(&notes, "")),
            vec!["old-pinned", "new", "mid"]
        );
    }

    #[test]
    fn equal_timestamps_keep_store_order() {
        let notes = vec![
            note("a", "", 1_000, false),
            note("b", "", 1_000, false),
            note("c", "", 1_000, false),
        ];
        assert_eq!(titles(&visible_notes(&notes, "")), vec!["a", "b", "c"]);
    }

    #[test]
    fn search_is_case_insensitive_and_covers_content() {
        let notes = vec![
            note("Groceries", "Milk and EGGS", 1_000, false),
            note("Work", "standup at ten", 2_000, false),
        ];
        assert_eq!(titles(&visible_notes(&notes, "eggs")), vec!["Groceries"]);
        assert_eq!(titles(&visible_notes(&notes, "WORK")), vec!["Work"]);
        assert!(visible_notes(&notes, "absent").is_empty());
    }

    #[test]
    fn blank_term_disables_filter() {
        let notes = vec![note("a", "", 1_000, false), note("b", "", 2_000, false)];
        assert_eq!(visible_notes(&notes, "   ").len(), 2);
    }

    #[test]
    fn summary_counts_pinned_and_visible() {
        let notes = vec![
            note("alpha", "", 1_000, true),
            note("beta", "", 2_000, false),
            note("alphabet", "", 3_000, false),
        ];
        let summary = summarize(&notes, "alpha");
        assert_eq!(summary.total, 3);
        assert_eq!(summary.pinned, 1);
        assert_eq!(summary.visible, 2);
    }
}
