//! Manages the ordered note collection and its write-through persistence.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    next_unique_millis, storage::KEY_NOTES, KeyValueStore, Note, NotePatch, Result,
};

/// The ordered note collection, persisted as a whole on every mutation.
///
/// The collection is flat and unindexed; order is insertion order. All
/// mutations run on the single caller thread, so the store takes `&mut self`
/// rather than locking.
pub struct NoteStore {
    store: Arc<dyn KeyValueStore>,
    notes: Vec<Note>,
    last_id_millis: i64,
}

impl NoteStore {
    /// Opens the store, loading any persisted notes.
    ///
    /// Unreadable or corrupt persisted state is logged and treated as an
    /// empty collection; it is never surfaced to the caller.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let notes = match store.get(KEY_NOTES) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Note>>(&raw) {
                Ok(notes) => {
                    info!("Loaded {} notes", notes.len());
                    notes
                }
                Err(e) => {
                    warn!("Failed to parse persisted notes, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No persisted notes found");
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read persisted notes, starting empty: {}", e);
                Vec::new()
            }
        };

        // Seed the id generator past any loaded ids so restarts within the
        // same millisecond cannot collide.
        let last_id_millis = notes
            .iter()
            .filter_map(|n| n.id.split('-').next()?.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            store,
            notes,
            last_id_millis,
        }
    }

    /// Returns the current notes in insertion order. Never fails.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    /// Looks up a note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Creates a note, appends it to the collection, and persists the full
    /// collection. Empty title and content are accepted; the created note is
    /// returned.
    pub fn add(&mut self, title: String, content: String, tag: Option<String>) -> Result<Note> {
        let millis = next_unique_millis(&mut self.last_id_millis);
        let note = Note::new(millis, title, content, tag);
        info!("Adding note: {}", note.id);

        self.notes.push(note.clone());
        self.persist()?;
        Ok(note)
    }

    /// Merges the supplied fields into the matching note and refreshes its
    /// `updated_at`. Unknown ids are a silent no-op: the UI only ever
    /// updates notes it has already loaded.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> Result<()> {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!("Update for unknown note id {} ignored", id);
            return Ok(());
        };

        patch.apply(note);
        note.updated_at = chrono::Utc::now();
        info!("Updated note: {}", id);
        self.persist()
    }

    /// Removes the matching note if present; unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            debug!("Delete for unknown note id {} ignored", id);
        } else {
            info!("Deleted note: {}", id);
        }
        self.persist()
    }

    /// Searches notes by title and content using fuzzy matching, returning
    /// matches sorted by relevance. Title matches weigh double.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &Note)> = self
            .notes
            .iter()
            .filter_map(|note| {
                let title_score = matcher.fuzzy_match(&note.title, query).unwrap_or(0);
                let content_score = matcher.fuzzy_match(&note.content, query).unwrap_or(0);
                let score = title_score * 2 + content_score;
                (score > 0).then_some((score, note))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!("Search '{}' matched {} notes", query, scored.len());
        scored.into_iter().map(|(_, note)| note).collect()
    }

    /// Serializes and writes the entire collection. There is no
    /// incremental/delta persistence.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.notes)?;
        self.store.set(KEY_NOTES, &json)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::{MemoryStore, Note, NotePatch};

    use super::*;

    fn store_pair() -> (Arc<MemoryStore>, NoteStore) {
        let kv = Arc::new(MemoryStore::new());
        let notes = NoteStore::open(kv.clone() as Arc<dyn KeyValueStore>);
        (kv, notes)
    }

    fn persisted_notes(kv: &MemoryStore) -> Vec<Note> {
        let raw = kv
            .get(KEY_NOTES)
            .expect("get should succeed")
            .expect("notes key should exist after a mutation");
        serde_json::from_str(&raw).expect("persisted notes should parse")
    }

    #[test]
    fn add_returns_note_with_matching_timestamps() {
        let (_, mut notes) = store_pair();
        let note = notes
            .add("Groceries".into(), "milk, eggs".into(), None)
            .expect("add should succeed");

        assert!(!note.id.is_empty());
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(notes.list().len(), 1);
    }

    #[test]
    fn update_merges_fields_and_refreshes_updated_at() {
        let (_, mut notes) = store_pair();
        let id = notes
            .add("Groceries".into(), "milk, eggs".into(), None)
            .expect("add should succeed")
            .id
            .clone();

        std::thread::sleep(Duration::from_millis(5));
        notes
            .update(
                &id,
                NotePatch {
                    content: Some("milk, eggs, bread".into()),
                    ..Default::default()
                },
            )
            .expect("update should succeed");

        let note = notes.get(&id).expect("note should still exist");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs, bread");
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn update_on_unknown_id_leaves_collection_unchanged() {
        let (_, mut notes) = store_pair();
        notes
            .add("a".into(), "b".into(), None)
            .expect("add should succeed");
        let before: Vec<String> = notes.list().iter().map(|n| n.id.clone()).collect();

        notes
            .update("missing", NotePatch { title: Some("x".into()), ..Default::default() })
            .expect("unknown-id update should be a no-op");

        let after: Vec<String> = notes.list().iter().map(|n| n.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(notes.list()[0].title, "a");
    }

    #[test]
    fn delete_then_update_does_not_resurrect() {
        let (_, mut notes) = store_pair();
        let id = notes
            .add("doomed".into(), "".into(), None)
            .expect("add should succeed")
            .id
            .clone();

        notes.delete(&id).expect("delete should succeed");
        notes
            .update(&id, NotePatch { content: Some("back?".into()), ..Default::default() })
            .expect("post-delete update should be a no-op");

        assert!(notes.list().is_empty());
        assert!(notes.get(&id).is_none());
    }

    #[test]
    fn ids_are_unique_within_a_session() {
        let (_, mut notes) = store_pair();
        for i in 0..50 {
            notes
                .add(format!("note {}", i), String::new(), None)
                .expect("add should succeed");
        }

        let mut ids: Vec<&str> = notes.list().iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn persisted_state_tracks_memory_after_every_mutation() {
        let (kv, mut notes) = store_pair();

        let id = notes
            .add("one".into(), "1".into(), Some("t".into()))
            .expect("add should succeed")
            .id
            .clone();
        notes
            .add("two".into(), "2".into(), None)
            .expect("add should succeed");
        notes
            .update(&id, NotePatch { content: Some("1!".into()), ..Default::default() })
            .expect("update should succeed");
        notes.delete(&id).expect("delete should succeed");

        let on_disk = persisted_notes(&kv);
        assert_eq!(on_disk.len(), notes.list().len());
        for (disk, mem) in on_disk.iter().zip(notes.list()) {
            assert_eq!(disk.id, mem.id);
            assert_eq!(disk.content, mem.content);
            assert_eq!(disk.updated_at, mem.updated_at);
        }
    }

    #[test]
    fn open_survives_corrupt_persisted_notes() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(KEY_NOTES, "{not json").expect("set should succeed");

        let notes = NoteStore::open(kv as Arc<dyn KeyValueStore>);
        assert!(notes.list().is_empty());
    }

    #[test]
    fn reopen_loads_insertion_order() {
        let kv = Arc::new(MemoryStore::new());
        {
            let mut notes = NoteStore::open(kv.clone() as Arc<dyn KeyValueStore>);
            notes.add("first".into(), "".into(), None).expect("add");
            notes.add("second".into(), "".into(), None).expect("add");
        }

        let reopened = NoteStore::open(kv as Arc<dyn KeyValueStore>);
        let titles: Vec<&str> = reopened.list().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[test]
    fn search_ranks_title_matches_first() {
        let (_, mut notes) = store_pair();
        notes
            .add("rocket fuel".into(), "notes about engines".into(), None)
            .expect("add should succeed");
        notes
            .add("shopping".into(), "buy rocket parts".into(), None)
            .expect("add should succeed");

        let hits = notes.search("rocket");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "rocket fuel");
    }
}
