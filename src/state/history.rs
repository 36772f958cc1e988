use std::sync::Arc;

use chrono::Utc;

use super::data::{EditHistoryEntry, ImageAsset};

/// Append-only log of completed edits.
///
/// Entries are stored oldest-first so `append` is O(1); readers get them
/// newest-first. There is no delete or update: undo works by pointing the
/// session at an older result, never by rewriting the log.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<Arc<EditHistoryEntry>>,
    next_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the next entry, stamped with a fresh id and the current time.
    /// The entry is not part of the log until it is appended.
    pub fn new_entry(
        &mut self,
        source_display_form: String,
        result: Arc<ImageAsset>,
        instruction: String,
    ) -> EditHistoryEntry {
        self.next_id += 1;
        EditHistoryEntry {
            id: self.next_id,
            source_display_form,
            result,
            instruction,
            created_at: Utc::now(),
        }
    }

    /// Append an entry; it becomes the newest one
    pub fn append(&mut self, entry: EditHistoryEntry) -> Arc<EditHistoryEntry> {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.id < entry.id),
            "history ids must increase"
        );
        let entry = Arc::new(entry);
        self.entries.push(Arc::clone(&entry));
        entry
    }

    /// All entries, most recent first
    pub fn all(&self) -> impl DoubleEndedIterator<Item = &Arc<EditHistoryEntry>> + ExactSizeIterator {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&Arc<EditHistoryEntry>> {
        self.entries.last()
    }

    pub fn get(&self, id: u64) -> Option<&Arc<EditHistoryEntry>> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .ok()
            .map(|index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
