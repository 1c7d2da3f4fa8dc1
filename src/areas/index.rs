//! Index (staging area)
//!
//! The diff core consumes the index as a sorted array of entries with
//! positional access: the index↔tree and workdir↔index synthesizers both
//! merge-walk it with a cursor, so entries must stay in byte-wise path
//! order at all times.

use crate::artifacts::index::index_entry::IndexEntry;

/// Index (staging area)
///
/// A sorted array of tracked files. Insertion keeps the array ordered;
/// lookups during diff synthesis are positional.
#[derive(Debug, Clone, Default)]
pub struct Index {
    /// Tracked files in ascending path order
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entry at the given position, None once the cursor runs past the end
    pub fn entry_at(&self, pos: usize) -> Option<&IndexEntry> {
        self.entries.get(pos)
    }

    /// Insert an entry, replacing any existing entry with the same path
    pub fn add(&mut self, entry: IndexEntry) {
        match self
            .entries
            .binary_search_by(|probe| probe.path.cmp(&entry.path))
        {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// True when any tracked path lies under the given directory prefix
    ///
    /// The prefix must carry its trailing `/`; because entries are sorted,
    /// the synthesizers only ever need to ask this about the entry at the
    /// current cursor position, but answering from the whole array keeps the
    /// question well-posed.
    pub fn has_entries_under(&self, dir_prefix: &str) -> bool {
        let start = self
            .entries
            .partition_point(|entry| entry.path.as_str() < dir_prefix);

        self.entries
            .get(start)
            .is_some_and(|entry| entry.path.starts_with(dir_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry::new(path.to_string(), ObjectId::zero(), EntryMetadata::default())
    }

    #[rstest]
    fn test_add_keeps_entries_sorted() {
        let mut index = Index::new();
        index.add(entry("b.txt"));
        index.add(entry("a.txt"));
        index.add(entry("sub/c.txt"));

        let paths = index
            .entries()
            .iter()
            .map(|e| e.path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["a.txt", "b.txt", "sub/c.txt"]);
    }

    #[rstest]
    fn test_add_replaces_same_path() {
        let mut index = Index::new();
        index.add(entry("a.txt"));
        index.add(entry("a.txt"));

        assert_eq!(index.len(), 1);
    }

    #[rstest]
    fn test_has_entries_under() {
        let mut index = Index::new();
        index.add(entry("sub/c.txt"));
        index.add(entry("subsequent.txt"));

        assert!(index.has_entries_under("sub/"));
        assert!(!index.has_entries_under("other/"));
        // "subsequent.txt" shares the byte prefix but not the directory
        assert!(!index.has_entries_under("subs/"));
    }
}
