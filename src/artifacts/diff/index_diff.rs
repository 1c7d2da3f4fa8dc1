//! Index↔tree delta synthesis
//!
//! The index is already a sorted array, and the tree walks its blobs in the
//! same byte order, so one cursor suffices: index entries sorting before the
//! current tree entry drain as Added, a tree entry with no index match comes
//! out Deleted, and a path match advances the cursor, emitting Modified only
//! when mode or hash differ. Whatever the cursor never reached drains as
//! Added at the end.

use crate::artifacts::diff::delta::{DeltaStatus, TreeChange};
use crate::artifacts::diff::delta_list::DeltaList;
use crate::artifacts::diff::tree_diff::join_path;
use crate::artifacts::objects::tree::{Tree, TreeEntry};

/// Index↔tree synthesizer
///
/// The tree is the old side of the comparison, the index the new side.
pub(crate) struct IndexTreeDiffer<'a, 'r> {
    list: &'a mut DeltaList<'r>,
    cursor: usize,
    prefix: String,
}

impl<'a, 'r> IndexTreeDiffer<'a, 'r> {
    pub fn new(list: &'a mut DeltaList<'r>) -> Self {
        IndexTreeDiffer {
            list,
            cursor: 0,
            prefix: String::new(),
        }
    }

    pub fn run(&mut self, old_tree: &Tree) -> anyhow::Result<()> {
        self.walk_tree(old_tree)?;
        // index entries past the last tree path are all additions
        self.drain_added(None)?;

        Ok(())
    }

    /// Visit the tree's blob entries in sorted path order
    fn walk_tree(&mut self, tree: &Tree) -> anyhow::Result<()> {
        for entry in tree.entries() {
            let saved_len = self.prefix.len();
            join_path(&mut self.prefix, &entry.name);

            let result = if entry.mode.is_tree() {
                self.list
                    .repo()
                    .database()
                    .tree(&entry.oid)
                    .and_then(|subtree| self.walk_tree(subtree))
            } else if entry.mode.is_gitlink() {
                // TODO: submodule support for commit entries in trees
                Ok(())
            } else {
                self.visit_blob(entry)
            };

            self.prefix.truncate(saved_len);
            result?;
        }

        Ok(())
    }

    fn visit_blob(&mut self, tree_entry: &TreeEntry) -> anyhow::Result<()> {
        // index entries that sort before this tree path are not in the tree
        self.drain_added(Some(self.prefix.clone()))?;

        let index = self.list.repo().index();
        let Some(index_entry) = index
            .entry_at(self.cursor)
            .filter(|entry| entry.path == self.prefix)
        else {
            // the tree entry has no index counterpart
            return self.list.push_from_one(
                DeltaStatus::Deleted,
                tree_entry.mode,
                Some(&tree_entry.oid),
                &self.prefix,
            );
        };

        self.cursor += 1;

        if index_entry.oid != tree_entry.oid || index_entry.metadata.mode != tree_entry.mode {
            let change = TreeChange::new(
                DeltaStatus::Modified,
                index_entry.path.clone(),
                tree_entry.mode,
                index_entry.metadata.mode,
                tree_entry.oid.clone(),
                index_entry.oid.clone(),
            );
            self.list.push_from_change(&change, &index_entry.path)?;
        }

        Ok(())
    }

    /// Emit Added deltas for index entries sorting before `stop_path`
    fn drain_added(&mut self, stop_path: Option<String>) -> anyhow::Result<()> {
        let index = self.list.repo().index();

        while let Some(entry) = index.entry_at(self.cursor) {
            if let Some(stop) = &stop_path
                && entry.path >= *stop
            {
                break;
            }

            self.list.push_from_one(
                DeltaStatus::Added,
                entry.metadata.mode,
                Some(&entry.oid),
                &entry.path,
            )?;
            self.cursor += 1;
        }

        Ok(())
    }
}
