//! In-memory note store mirrored to a persisted slot.
//!
//! # Responsibility
//! - Own the ordered note collection plus transient selection/search state.
//! - Apply create/update/duplicate/delete/select mutations.
//! - Mirror the whole collection to the slot after every mutation.
//!
//! # Invariants
//! - Exactly one note per id.
//! - Store order is creation order, newest first; display order is derived.
//! - `active_id`, when set, always names a note in the store.
//! - Persistence failures are logged, never returned to callers.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{Note, NoteColor, NoteId, NotePatch};
use crate::storage::{decode_notes, encode_notes, LoadOutcome, SlotStorage, StorageError};
use crate::view::{summarize, visible_notes, NoteCard, StoreSummary};
use log::{debug, error, info, warn};

pub struct NoteStore<S: SlotStorage, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    key: String,
    notes: Vec<Note>,
    active_id: Option<NoteId>,
    search_term: String,
    last_persist_error: Option<String>,
}

impl<S: SlotStorage> NoteStore<S, SystemClock> {
    /// Loads the store from `key` using wall-clock time.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        Self::load_with_clock(storage, key, SystemClock)
    }
}

impl<S: SlotStorage, C: Clock> NoteStore<S, C> {
    /// Loads the store from `key`.
    ///
    /// Absent, unreadable or malformed slot data yields an empty store.
    /// Nothing is written back until the first mutation.
    pub fn load_with_clock(storage: S, key: impl Into<String>, clock: C) -> Self {
        let key = key.into();
        let raw = match storage.read(&key) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=slot_read_failed error={}",
                    err
                );
                None
            }
        };

        let notes = match decode_notes(raw.as_deref()) {
            LoadOutcome::Empty => {
                info!("event=store_load module=store status=ok notes=0 source=empty");
                Vec::new()
            }
            LoadOutcome::Malformed { reason } => {
                warn!(
                    "event=store_load module=store status=degraded error_code=slot_malformed reason={}",
                    reason
                );
                Vec::new()
            }
            LoadOutcome::Loaded { notes, dropped } => {
                if dropped > 0 {
                    warn!(
                        "event=store_load module=store status=degraded notes={} dropped={}",
                        notes.len(),
                        dropped
                    );
                } else {
                    info!(
                        "event=store_load module=store status=ok notes={}",
                        notes.len()
                    );
                }
                notes
            }
        };

        Self {
            storage,
            clock,
            key,
            notes,
            active_id: None,
            search_term: String::new(),
            last_persist_error: None,
        }
    }

    /// Inserts an empty note at the front and selects it.
    pub fn create(&mut self) -> NoteId {
        let note = Note::blank(self.clock.now());
        let id = note.id.clone();
        self.notes.insert(0, note);
        self.active_id = Some(id.clone());
        debug!("event=note_create module=store status=ok note_id={}", id);
        self.persist();
        id
    }

    /// Merges `patch` into the note and refreshes its `updated_at`.
    ///
    /// Returns `None` (and persists nothing) when `id` is unknown.
    pub fn update(&mut self, id: &NoteId, patch: NotePatch) -> Option<&Note> {
        let now = self.clock.now();
        let index = self.position(id)?;
        self.notes[index].apply(patch, now);
        debug!("event=note_update module=store status=ok note_id={}", id);
        self.persist();
        self.notes.get(index)
    }

    /// Copies a note under a fresh id and selects the copy.
    pub fn duplicate(&mut self, id: &NoteId) -> Option<NoteId> {
        let now = self.clock.now();
        let copy = self.get(id)?.duplicate(now);
        let copy_id = copy.id.clone();
        self.notes.insert(0, copy);
        self.active_id = Some(copy_id.clone());
        debug!(
            "event=note_duplicate module=store status=ok source_id={} note_id={}",
            id, copy_id
        );
        self.persist();
        Some(copy_id)
    }

    /// Removes a note; returns `false` when `id` is unknown.
    ///
    /// When the removed note was active, selection moves to the first
    /// remaining note in store order, or to none.
    pub fn delete(&mut self, id: &NoteId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.notes.remove(index);
        if self.active_id.as_ref() == Some(id) {
            self.active_id = self.notes.first().map(|note| note.id.clone());
        }
        debug!("event=note_delete module=store status=ok note_id={}", id);
        self.persist();
        true
    }

    /// Points the transient selection at `id`.
    ///
    /// Unknown ids leave the selection untouched and return `false`.
    pub fn select(&mut self, id: &NoteId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active_id = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.active_id = None;
    }

    /// Flips the pin flag; returns the new value.
    pub fn toggle_pin(&mut self, id: &NoteId) -> Option<bool> {
        let pinned = !self.get(id)?.pinned;
        self.update(id, NotePatch::default().pinned(pinned))
            .map(|note| note.pinned)
    }

    pub fn set_color(&mut self, id: &NoteId, color: NoteColor) -> Option<&Note> {
        self.update(id, NotePatch::default().color(color))
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// All notes in store order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn active_id(&self) -> Option<&NoteId> {
        self.active_id.as_ref()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_id.as_ref().and_then(|id| self.get(id))
    }

    /// Notes to render for the current search term, in display order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        visible_notes(&self.notes, &self.search_term)
    }

    /// List cards for the current search term, in display order.
    pub fn cards(&self) -> Vec<NoteCard> {
        self.visible_notes()
            .into_iter()
            .map(|note| NoteCard::from_note(note, self.active_id.as_ref()))
            .collect()
    }

    pub fn summary(&self) -> StoreSummary {
        summarize(&self.notes, &self.search_term)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Message of the most recent failed slot write, cleared on success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    fn persist(&mut self) {
        let result = encode_notes(&self.notes)
            .map_err(StorageError::from)
            .and_then(|raw| {
                self.storage.write(&self.key, &raw)?;
                Ok(raw.len())
            });

        match result {
            Ok(bytes) => {
                debug!(
                    "event=store_persist module=store status=ok notes={} bytes={}",
                    self.notes.len(),
                    bytes
                );
                self.last_persist_error = None;
            }
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error notes={} error={}",
                    self.notes.len(),
                    err
                );
                self.last_persist_error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::clock::ManualClock;
    use crate::model::note::{NoteColor, NoteId, NotePatch};
    use crate::storage::{MemorySlotStorage, SlotStorage, StorageError, StorageResult};

    const KEY: &str = "notes";

    struct ReadOnlyStorage;

    impl SlotStorage for ReadOnlyStorage {
        fn read(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn store(clock: &ManualClock) -> NoteStore<MemorySlotStorage, &ManualClock> {
        NoteStore::load_with_clock(MemorySlotStorage::new(), KEY, clock)
    }

    #[test]
    fn create_inserts_newest_first_and_selects() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let first = store.create();
        clock.advance(10);
        let second = store.create();

        let ids = store.notes().iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids, vec![second.clone(), first]);
        assert_eq!(store.active_id(), Some(&second));

        let created = store.get(&second).unwrap();
        assert!(created.title.is_empty());
        assert!(created.content.is_empty());
        assert!(!created.pinned);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.created_at.epoch_ms(), 1_010);
    }

    #[test]
    fn update_unknown_id_is_noop_without_write() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        store.create();
        let writes = store.storage().write_count();

        assert!(store
            .update(&NoteId::from("missing"), NotePatch::default().title("x"))
            .is_none());
        assert!(!store.delete(&NoteId::from("missing")));
        assert!(store.duplicate(&NoteId::from("missing")).is_none());
        assert_eq!(store.storage().write_count(), writes);
    }

    #[test]
    fn update_keeps_created_at_and_advances_updated_at() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let id = store.create();
        clock.advance(500);

        let note = store
            .update(&id, NotePatch::default().title("Plan").content("body"))
            .unwrap();
        assert_eq!(note.title, "Plan");
        assert_eq!(note.content, "body");
        assert_eq!(note.created_at.epoch_ms(), 1_000);
        assert_eq!(note.updated_at.epoch_ms(), 1_500);
    }

    #[test]
    fn update_with_clock_behind_does_not_regress() {
        let clock = ManualClock::starting_at(5_000);
        let mut store = store(&clock);
        let id = store.create();
        clock.set(1_000);

        let note = store.update(&id, NotePatch::default().content("x")).unwrap();
        assert_eq!(note.updated_at.epoch_ms(), 5_000);
    }

    #[test]
    fn duplicate_selects_copy() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let id = store.create();
        store.update(&id, NotePatch::default().title("Trip").content("bags"));
        clock.advance(100);

        let copy_id = store.duplicate(&id).unwrap();
        let copy = store.get(&copy_id).unwrap();
        assert_eq!(copy.title, "Trip (Copy)");
        assert_eq!(copy.content, "bags");
        assert_eq!(copy.created_at.epoch_ms(), 1_100);
        assert_eq!(store.active_id(), Some(&copy_id));
        assert_eq!(store.notes()[0].id, copy_id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn deleting_active_note_falls_back_to_first_in_store_order() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let oldest = store.create();
        let middle = store.create();
        let newest = store.create();

        assert!(store.select(&middle));
        assert!(store.delete(&middle));
        assert_eq!(store.active_id(), Some(&newest));

        assert!(store.delete(&newest));
        assert_eq!(store.active_id(), Some(&oldest));

        assert!(store.delete(&oldest));
        assert_eq!(store.active_id(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn deleting_inactive_note_keeps_selection() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let first = store.create();
        let second = store.create();
        store.select(&first);

        store.delete(&second);
        assert_eq!(store.active_id(), Some(&first));
    }

    #[test]
    fn select_does_not_persist_and_rejects_unknown_ids() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let first = store.create();
        let second = store.create();
        let writes = store.storage().write_count();

        assert!(store.select(&first));
        assert!(!store.select(&NoteId::from("missing")));
        assert_eq!(store.active_id(), Some(&first));
        assert_eq!(store.active_note().unwrap().id, first);
        store.set_search_term("anything");
        assert_eq!(store.storage().write_count(), writes);
        assert_ne!(first, second);
    }

    #[test]
    fn every_mutation_writes_the_slot() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let id = store.create();
        store.update(&id, NotePatch::default().title("a"));
        store.toggle_pin(&id);
        store.set_color(&id, NoteColor::Pink);
        let copy = store.duplicate(&id).unwrap();
        store.delete(&copy);
        assert_eq!(store.storage().write_count(), 6);

        let raw = store.storage().get(KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["color"], "pink");
        assert_eq!(array[0]["pinned"], true);
    }

    #[test]
    fn toggle_pin_flips_flag() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let id = store.create();
        assert_eq!(store.toggle_pin(&id), Some(true));
        assert_eq!(store.toggle_pin(&id), Some(false));
        assert_eq!(store.toggle_pin(&NoteId::from("missing")), None);
    }

    #[test]
    fn write_failure_is_recorded_not_returned() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = NoteStore::load_with_clock(ReadOnlyStorage, KEY, &clock);
        let id = store.create();
        assert_eq!(store.len(), 1);
        assert!(store.last_persist_error().unwrap().contains("quota"));
        assert!(store.update(&id, NotePatch::default().title("kept")).is_some());
        assert_eq!(store.get(&id).unwrap().title, "kept");
    }

    #[test]
    fn cards_follow_display_order_and_search() {
        let clock = ManualClock::starting_at(1_000);
        let mut store = store(&clock);
        let plain = store.create();
        store.update(&plain, NotePatch::default().title("Recipe"));
        clock.advance(10);
        let pinned = store.create();
        store.update(&pinned, NotePatch::default().title("Todo").pinned(true));
        clock.advance(10);
        store.update(&plain, NotePatch::default().content("flour"));

        let cards = store.cards();
        assert_eq!(cards[0].id, pinned);
        assert_eq!(cards[1].id, plain);

        store.set_search_term("FLOUR");
        let cards = store.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].display_title, "Recipe");
        assert_eq!(store.summary().visible, 1);
        assert_eq!(store.summary().pinned, 1);
    }
}
