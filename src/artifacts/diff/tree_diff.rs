//! Tree↔tree delta synthesis
//!
//! Two trees are compared one level at a time: the sorted entry lists are
//! merge-walked, and the resulting change records drive recursion. Four
//! tree-shaped cases fall out of the records:
//!
//! - both sides directories: load both subtrees and recurse
//! - a directory only on one side: walk that subtree, every blob becoming a
//!   single-sided delta with the enclosing status
//! - a tree became a non-tree (or vice versa): the merge never pairs the two
//!   entries, because directories sort as `name/`, so the transition is
//!   already split into an independent Deleted and Added record
//! - blob against blob: a two-sided delta
//!
//! The differ threads one path-prefix buffer through the recursion,
//! appending on descent and truncating on ascent.

use crate::artifacts::diff::delta::{DeltaStatus, TreeChange};
use crate::artifacts::diff::delta_list::DeltaList;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};

/// One-level comparison of two trees' entries
///
/// Merge-walks both sorted entry lists and eagerly returns the differing
/// entries as records. Directory pairs surface as Modified records for the
/// caller to recurse into.
pub(crate) fn tree_changes(old: &Tree, new: &Tree) -> Vec<TreeChange> {
    let mut changes = Vec::new();
    let (mut old_pos, mut new_pos) = (0, 0);

    loop {
        match (old.entries().get(old_pos), new.entries().get(new_pos)) {
            (Some(old_entry), Some(new_entry)) => {
                match old_entry.sort_key().cmp(&new_entry.sort_key()) {
                    std::cmp::Ordering::Less => {
                        changes.push(deleted_change(old_entry));
                        old_pos += 1;
                    }
                    std::cmp::Ordering::Greater => {
                        changes.push(added_change(new_entry));
                        new_pos += 1;
                    }
                    std::cmp::Ordering::Equal => {
                        if old_entry.mode != new_entry.mode || old_entry.oid != new_entry.oid {
                            changes.push(TreeChange::new(
                                DeltaStatus::Modified,
                                old_entry.name.clone(),
                                old_entry.mode,
                                new_entry.mode,
                                old_entry.oid.clone(),
                                new_entry.oid.clone(),
                            ));
                        }
                        old_pos += 1;
                        new_pos += 1;
                    }
                }
            }
            (Some(old_entry), None) => {
                changes.push(deleted_change(old_entry));
                old_pos += 1;
            }
            (None, Some(new_entry)) => {
                changes.push(added_change(new_entry));
                new_pos += 1;
            }
            (None, None) => break,
        }
    }

    changes
}

fn deleted_change(entry: &TreeEntry) -> TreeChange {
    TreeChange::new(
        DeltaStatus::Deleted,
        entry.name.clone(),
        entry.mode,
        Default::default(),
        entry.oid.clone(),
        ObjectId::zero(),
    )
}

fn added_change(entry: &TreeEntry) -> TreeChange {
    TreeChange::new(
        DeltaStatus::Added,
        entry.name.clone(),
        Default::default(),
        entry.mode,
        ObjectId::zero(),
        entry.oid.clone(),
    )
}

/// Tree↔tree synthesizer
pub(crate) struct TreeDiffer<'a, 'r> {
    list: &'a mut DeltaList<'r>,
    prefix: String,
}

impl<'a, 'r> TreeDiffer<'a, 'r> {
    pub fn new(list: &'a mut DeltaList<'r>) -> Self {
        TreeDiffer {
            list,
            prefix: String::new(),
        }
    }

    pub fn run(&mut self, old: &Tree, new: &Tree) -> anyhow::Result<()> {
        for change in tree_changes(old, new) {
            self.visit(&change)?;
        }

        Ok(())
    }

    fn visit(&mut self, change: &TreeChange) -> anyhow::Result<()> {
        let saved_len = self.prefix.len();
        join_path(&mut self.prefix, &change.path);

        let result = if change.old_mode.is_tree() && change.new_mode.is_tree() {
            let database = self.list.repo().database();
            let old_subtree = database.tree(&change.old_oid)?;
            let new_subtree = database.tree(&change.new_oid)?;
            self.run(old_subtree, new_subtree)
        } else if change.old_mode.is_tree() || change.new_mode.is_tree() {
            let (status, oid) = if change.new_mode.is_tree() {
                (DeltaStatus::Added, &change.new_oid)
            } else {
                (DeltaStatus::Deleted, &change.old_oid)
            };
            let subtree = self.list.repo().database().tree(oid)?;
            self.walk_subtree(subtree, status)
        } else {
            self.list.push_from_change(change, &self.prefix)
        };

        self.prefix.truncate(saved_len);

        result
    }

    /// Emit every blob under a one-sided subtree with the enclosing status
    fn walk_subtree(&mut self, tree: &Tree, status: DeltaStatus) -> anyhow::Result<()> {
        for entry in tree.entries() {
            let saved_len = self.prefix.len();
            join_path(&mut self.prefix, &entry.name);

            let result = if entry.mode.is_tree() {
                self.list
                    .repo()
                    .database()
                    .tree(&entry.oid)
                    .and_then(|subtree| self.walk_subtree(subtree, status))
            } else {
                self.list
                    .push_from_one(status, entry.mode, Some(&entry.oid), &self.prefix)
            };

            self.prefix.truncate(saved_len);
            result?;
        }

        Ok(())
    }
}

/// Append a path component to a `/`-separated prefix buffer
pub(crate) fn join_path(prefix: &mut String, component: &str) {
    if !prefix.is_empty() {
        prefix.push('/');
    }
    prefix.push_str(component);
}
