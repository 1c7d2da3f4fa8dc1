//! Delta list
//!
//! An ordered collection of deltas plus the resolved options they were
//! synthesized under and the repository they came from. Construction honors
//! the `REVERSE` flag here, in the two push paths, so the synthesizers never
//! branch on direction themselves.

use crate::areas::repository::Repository;
use crate::artifacts::diff::delta::{Delta, DeltaStatus, TreeChange};
use crate::artifacts::diff::options::{DiffFlags, DiffOptions};
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;

/// Ordered collection of deltas
///
/// Deltas are appended in ascending path order by the synthesizers and owned
/// by the list. The repository handle is borrowed for the list's lifetime so
/// the patch engine can fetch blob content later.
pub struct DeltaList<'r> {
    pub(crate) repo: &'r Repository,
    pub(crate) opts: DiffOptions,
    pub(crate) deltas: Vec<Delta>,
}

impl<'r> DeltaList<'r> {
    pub(crate) fn new(repo: &'r Repository, opts: DiffOptions) -> Self {
        DeltaList {
            repo,
            opts,
            deltas: Vec::new(),
        }
    }

    pub fn repo(&self) -> &'r Repository {
        self.repo
    }

    pub fn options(&self) -> &DiffOptions {
        &self.opts
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Delta> {
        self.deltas.iter()
    }

    /// Append a single-sided delta
    ///
    /// Used for Added and Deleted entries as well as Untracked and Ignored
    /// observations; only the side implied by the (possibly reversed) status
    /// is populated. An Added delta fills the new side, every other status
    /// fills the old side.
    pub(crate) fn push_from_one(
        &mut self,
        status: DeltaStatus,
        mode: EntryMode,
        oid: Option<&ObjectId>,
        path: &str,
    ) -> anyhow::Result<()> {
        let status = if self.opts.flags.contains(DiffFlags::REVERSE) {
            status.reversed()
        } else {
            status
        };

        let oid = oid.cloned().unwrap_or_else(ObjectId::zero);
        let delta = if status == DeltaStatus::Added {
            Delta {
                status,
                old_mode: EntryMode::Absent,
                new_mode: mode,
                old_oid: ObjectId::zero(),
                new_oid: oid,
                path: path.to_string(),
                new_path: None,
                binary: None,
                similarity: 0,
            }
        } else {
            Delta {
                status,
                old_mode: mode,
                new_mode: EntryMode::Absent,
                old_oid: oid,
                new_oid: ObjectId::zero(),
                path: path.to_string(),
                new_path: None,
                binary: None,
                similarity: 0,
            }
        };

        self.deltas.push(delta);

        Ok(())
    }

    /// Append a two-sided delta from a tree-change record
    ///
    /// `path` is the full repository-relative path (the record's own path
    /// field may only hold the entry name at its tree level).
    pub(crate) fn push_from_change(
        &mut self,
        change: &TreeChange,
        path: &str,
    ) -> anyhow::Result<()> {
        let delta = if self.opts.flags.contains(DiffFlags::REVERSE) {
            Delta {
                status: change.status.reversed(),
                old_mode: change.new_mode,
                new_mode: change.old_mode,
                old_oid: change.new_oid.clone(),
                new_oid: change.old_oid.clone(),
                path: path.to_string(),
                new_path: None,
                binary: None,
                similarity: 0,
            }
        } else {
            Delta {
                status: change.status,
                old_mode: change.old_mode,
                new_mode: change.new_mode,
                old_oid: change.old_oid.clone(),
                new_oid: change.new_oid.clone(),
                path: path.to_string(),
                new_path: None,
                binary: None,
                similarity: 0,
            }
        };

        self.deltas.push(delta);

        Ok(())
    }
}

impl<'a> IntoIterator for &'a DeltaList<'_> {
    type Item = &'a Delta;
    type IntoIter = std::slice::Iter<'a, Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}
