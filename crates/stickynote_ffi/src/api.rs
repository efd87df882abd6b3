//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note store operations to the UI shell via FRB.
//! - Hold one process-wide store session opened lazily from config.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through response envelopes, never thrown.

use log::{error, info};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use stickynote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteCard, NoteColor, NoteId, NotePatch, NoteStore, SqliteSlotStorage, StoreConfig,
};

type Session = NoteStore<SqliteSlotStorage>;

static SESSION: Lazy<Mutex<Option<Session>>> = Lazy::new(|| Mutex::new(None));

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat note shape handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Title fallback used by list rows.
    pub display_title: String,
    pub preview: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    /// RFC 3339 UTC timestamp.
    pub updated_at: String,
    pub pinned: bool,
    pub color: String,
}

/// Visible list for the current search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Pinned first, then most recently updated.
    pub items: Vec<NoteItem>,
    pub active_id: Option<String>,
    pub total: u32,
    pub pinned: u32,
    pub message: String,
}

/// Result envelope for single-note operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Note touched by the operation, when it still exists.
    pub note: Option<NoteItem>,
    /// Selected note id after the operation.
    pub active_id: Option<String>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>, session: &Session) -> Self {
        Self {
            ok: true,
            note,
            active_id: session.active_id().map(ToString::to_string),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            active_id: None,
            message: message.into(),
        }
    }
}

/// Opens (or reopens) the session on an explicit storage file.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_notes_db(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let mut config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => return format!("configure_notes_db failed: {err}"),
    };
    config.db_path = PathBuf::from(trimmed);

    match open_session(&config) {
        Ok(session) => {
            let mut guard = lock_session();
            *guard = Some(session);
            String::new()
        }
        Err(err) => err,
    }
}

/// Lists visible notes, updating the transient search term when given.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(search: Option<String>) -> NotesListResponse {
    let result = with_session(|session| {
        if let Some(term) = search {
            session.set_search_term(term);
        }
        let items = session
            .cards()
            .into_iter()
            .filter_map(|card| session.get(&card.id).map(|note| to_note_item(note, &card)))
            .collect::<Vec<_>>();
        let summary = session.summary();
        let message = if items.is_empty() {
            "No notes.".to_string()
        } else {
            format!("{} note(s).", items.len())
        };
        Ok(NotesListResponse {
            items,
            active_id: session.active_id().map(ToString::to_string),
            total: saturating_u32(summary.total),
            pinned: saturating_u32(summary.pinned),
            message,
        })
    });

    result.unwrap_or_else(|err| NotesListResponse {
        items: Vec::new(),
        active_id: None,
        total: 0,
        pinned: 0,
        message: format!("notes_list failed: {err}"),
    })
}

/// Creates an empty note and selects it.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> NoteActionResponse {
    with_action(|session| {
        let id = session.create();
        let item = item_for(session, &id);
        Ok(NoteActionResponse::success("Note created.", item, session))
    })
}

/// Applies a partial update; `None` fields stay unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_update(
    id: String,
    title: Option<String>,
    content: Option<String>,
    pinned: Option<bool>,
    color: Option<String>,
) -> NoteActionResponse {
    let color = match color.map(|raw| raw.parse::<NoteColor>()).transpose() {
        Ok(color) => color,
        Err(err) => return NoteActionResponse::failure(format!("notes_update failed: {err}")),
    };
    let patch = NotePatch {
        title,
        content,
        pinned,
        color,
    };
    let id = NoteId::from(id);

    with_action(|session| {
        if session.update(&id, patch).is_none() {
            return Err(format!("note not found: {id}"));
        }
        let item = item_for(session, &id);
        Ok(NoteActionResponse::success("Note updated.", item, session))
    })
}

/// Copies a note and selects the copy.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_duplicate(id: String) -> NoteActionResponse {
    let id = NoteId::from(id);
    with_action(|session| {
        let copy_id = session
            .duplicate(&id)
            .ok_or_else(|| format!("note not found: {id}"))?;
        let item = item_for(session, &copy_id);
        Ok(NoteActionResponse::success("Note duplicated.", item, session))
    })
}

/// Deletes a note; `active_id` in the response reflects the new selection.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> NoteActionResponse {
    let id = NoteId::from(id);
    with_action(|session| {
        if !session.delete(&id) {
            return Err(format!("note not found: {id}"));
        }
        Ok(NoteActionResponse::success("Note deleted.", None, session))
    })
}

/// Selects a note for the detail pane. No persistence effect.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_select(id: String) -> NoteActionResponse {
    let id = NoteId::from(id);
    with_action(|session| {
        if !session.select(&id) {
            return Err(format!("note not found: {id}"));
        }
        let item = item_for(session, &id);
        Ok(NoteActionResponse::success("Note selected.", item, session))
    })
}

/// Returns the selected note, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_active() -> NoteActionResponse {
    with_action(|session| {
        let item = session
            .active_id()
            .cloned()
            .and_then(|id| item_for(session, &id));
        let message = if item.is_some() {
            "Active note."
        } else {
            "No active note."
        };
        Ok(NoteActionResponse::success(message, item, session))
    })
}

fn with_action(
    f: impl FnOnce(&mut Session) -> Result<NoteActionResponse, String>,
) -> NoteActionResponse {
    with_session(f).unwrap_or_else(NoteActionResponse::failure)
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    let mut guard = lock_session();
    if guard.is_none() {
        let config =
            StoreConfig::from_env().map_err(|err| format!("notes config invalid: {err}"))?;
        *guard = Some(open_session(&config)?);
    }
    match guard.as_mut() {
        Some(session) => f(session),
        None => Err("notes session unavailable".to_string()),
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    // A panic while holding the lock leaves the store itself consistent.
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn open_session(config: &StoreConfig) -> Result<Session, String> {
    match SqliteSlotStorage::open(&config.db_path) {
        Ok(storage) => {
            info!(
                "event=ffi_session_open module=ffi status=ok db_path={}",
                config.db_path.display()
            );
            Ok(NoteStore::load(storage, config.storage_key.clone()))
        }
        Err(err) => {
            error!(
                "event=ffi_session_open module=ffi status=error db_path={} error={}",
                config.db_path.display(),
                err
            );
            Err(format!("notes storage open failed: {err}"))
        }
    }
}

fn item_for(session: &Session, id: &NoteId) -> Option<NoteItem> {
    session
        .get(id)
        .map(|note| to_note_item(note, &NoteCard::from_note(note, session.active_id())))
}

fn to_note_item(note: &Note, card: &NoteCard) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        display_title: card.display_title.clone(),
        preview: card.preview.clone(),
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        pinned: note.pinned,
        color: note.color.to_string(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        configure_notes_db, core_version, init_logging, notes_active, notes_create,
        notes_delete, notes_duplicate, notes_list, notes_select, notes_update, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_rejects_blank_path() {
        assert!(!configure_notes_db("   ".to_string()).is_empty());
    }

    #[test]
    fn notes_update_rejects_unknown_color_before_touching_session() {
        let response = notes_update("x".to_string(), None, None, None, Some("teal".to_string()));
        assert!(!response.ok);
        assert!(response.message.contains("teal"));
    }

    // Single test drives the shared session end to end.
    #[test]
    fn session_flow_covers_every_operation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffi.sqlite3");
        let configured = configure_notes_db(path.to_str().unwrap().to_string());
        assert!(configured.is_empty(), "{configured}");

        let first = notes_create();
        assert!(first.ok, "{}", first.message);
        let first_id = first.note.expect("created note").id;
        assert_eq!(first.active_id.as_deref(), Some(first_id.as_str()));

        let updated = notes_update(
            first_id.clone(),
            Some("Packing".to_string()),
            Some("passport, charger".to_string()),
            Some(true),
            Some("Blue".to_string()),
        );
        assert!(updated.ok, "{}", updated.message);
        let note = updated.note.unwrap();
        assert_eq!(note.title, "Packing");
        assert_eq!(note.color, "blue");
        assert!(note.pinned);

        let copy = notes_duplicate(first_id.clone());
        assert!(copy.ok, "{}", copy.message);
        let copy_id = copy.note.unwrap().id;
        assert_eq!(copy.active_id.as_deref(), Some(copy_id.as_str()));

        let listed = notes_list(Some("CHARGER".to_string()));
        assert_eq!(listed.items.len(), 2);
        assert_eq!(listed.total, 2);
        assert_eq!(listed.pinned, 2);

        let selected = notes_select(first_id.clone());
        assert!(selected.ok);
        assert_eq!(notes_active().note.unwrap().id, first_id);

        let deleted = notes_delete(first_id.clone());
        assert!(deleted.ok);
        assert_eq!(deleted.active_id.as_deref(), Some(copy_id.as_str()));

        assert!(!notes_delete(first_id).ok);
        assert!(!notes_select("missing".to_string()).ok);

        let listed = notes_list(Some(String::new()));
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].title, "Packing (Copy)");
    }
}
