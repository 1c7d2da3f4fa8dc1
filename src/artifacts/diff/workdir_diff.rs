//! Workdir↔index delta synthesis
//!
//! The working directory is enumerated one directory at a time and
//! merge-walked against the index cursor, with the index as the old side.
//!
//! ## Change detection
//!
//! A path match does not mean equal content. A size mismatch is conclusive
//! on its own. A canonical-mode flip (say, the executable bit) marks the
//! entry modified and rehashes the content so the delta carries the real new
//! hash. Anything else that differs in the cached stat fields only raises
//! suspicion: the content is rehashed and compared against the indexed hash,
//! and a match means no change at all.
//!
//! ## Untracked directories
//!
//! Unlike core git, a directory containing no tracked entries is never
//! recursed into; it surfaces as a single Untracked (or Ignored) delta for
//! the directory itself.

use crate::areas::ignores::IgnoreContext;
use crate::areas::workspace::WorkdirEntry;
use crate::artifacts::diff::delta::{DeltaStatus, TreeChange};
use crate::artifacts::diff::delta_list::DeltaList;
use crate::artifacts::objects::object_id::ObjectId;

/// Workdir↔index synthesizer
pub(crate) struct WorkdirDiffer<'a, 'r> {
    list: &'a mut DeltaList<'r>,
    cursor: usize,
}

impl<'a, 'r> WorkdirDiffer<'a, 'r> {
    pub fn new(list: &'a mut DeltaList<'r>) -> Self {
        WorkdirDiffer { list, cursor: 0 }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.walk_dir("")?;
        // index entries past the last workdir path are all deletions
        self.drain_deleted(None)?;

        Ok(())
    }

    fn walk_dir(&mut self, dir: &str) -> anyhow::Result<()> {
        let repo = self.list.repo();
        let entries = repo.workspace().list_dir(dir)?;
        let ignores = repo.ignores_for(dir)?;

        for wd_entry in &entries {
            self.visit_entry(wd_entry, &ignores)?;
        }

        Ok(())
    }

    fn visit_entry(
        &mut self,
        wd_entry: &WorkdirEntry,
        ignores: &IgnoreContext,
    ) -> anyhow::Result<()> {
        // index entries that sort before this workdir path are gone from disk
        self.drain_deleted(Some(wd_entry.path.clone()))?;

        let repo = self.list.repo();
        let Some(index_entry) = repo
            .index()
            .entry_at(self.cursor)
            .filter(|entry| entry.path == wd_entry.path)
        else {
            return self.visit_unmatched(wd_entry, ignores);
        };

        self.cursor += 1;

        // a symlink↔regular transition cannot be expressed as Modified
        if !wd_entry.mode().same_type(&index_entry.metadata.mode) {
            self.list.push_from_one(
                DeltaStatus::Deleted,
                index_entry.metadata.mode,
                Some(&index_entry.oid),
                &index_entry.path,
            )?;
            // the trailing slash keeps directory paths from ever matching
            debug_assert!(!wd_entry.is_dir());
            return self
                .list
                .push_from_one(DeltaStatus::Added, wd_entry.mode(), None, &wd_entry.path);
        }

        let mut modified = false;
        let mut new_oid = ObjectId::zero();

        if wd_entry.stat.size != index_entry.metadata.size {
            // conclusive without hashing; the new oid stays zero
            modified = true;
        } else if wd_entry.mode() != index_entry.metadata.mode {
            // mode flip with equal size: rehash so the delta carries the
            // real content hash, equal oids when only the mode changed
            new_oid = self.rehash(wd_entry)?;
            modified = true;
        } else if !index_entry.metadata.times_match(&wd_entry.stat) {
            new_oid = self.rehash(wd_entry)?;
            modified = new_oid != index_entry.oid;
        }

        if modified {
            let change = TreeChange::new(
                DeltaStatus::Modified,
                wd_entry.path.clone(),
                index_entry.metadata.mode,
                wd_entry.mode(),
                index_entry.oid.clone(),
                new_oid,
            );
            self.list.push_from_change(&change, &wd_entry.path)?;
        }

        Ok(())
    }

    /// Handle a workdir entry with no index counterpart
    fn visit_unmatched(
        &mut self,
        wd_entry: &WorkdirEntry,
        ignores: &IgnoreContext,
    ) -> anyhow::Result<()> {
        // fifos, sockets and such cannot be tracked at all
        if wd_entry.mode().is_absent() {
            return Ok(());
        }

        if !wd_entry.is_dir() {
            return self.found_new(wd_entry, ignores);
        }

        let repo = self.list.repo();
        if repo.workspace().contains_repository(&wd_entry.path) {
            // TODO: deal with submodules and embedded repositories
            return Ok(());
        }

        if repo.index().has_entries_under(&wd_entry.path) {
            return self.walk_dir(&wd_entry.path);
        }

        // no tracked entries below: report the directory itself rather than
        // recursing, diverging from core git on purpose
        self.found_new(wd_entry, ignores)
    }

    fn found_new(
        &mut self,
        wd_entry: &WorkdirEntry,
        ignores: &IgnoreContext,
    ) -> anyhow::Result<()> {
        let status = if ignores.is_ignored(&wd_entry.path) {
            DeltaStatus::Ignored
        } else {
            DeltaStatus::Untracked
        };

        self.list
            .push_from_one(status, wd_entry.mode(), None, &wd_entry.path)
    }

    /// Hash the workdir content behind an entry, symlinks as their target
    fn rehash(&self, wd_entry: &WorkdirEntry) -> anyhow::Result<ObjectId> {
        let repo = self.list.repo();
        let full_path = repo.workspace().absolute(&wd_entry.path);

        if wd_entry.mode().is_symlink() {
            repo.database().hash_symlink(&full_path)
        } else {
            repo.database().hash_file(&full_path)
        }
    }

    /// Emit Deleted deltas for index entries sorting before `stop_path`
    fn drain_deleted(&mut self, stop_path: Option<String>) -> anyhow::Result<()> {
        let index = self.list.repo().index();

        while let Some(entry) = index.entry_at(self.cursor) {
            if let Some(stop) = &stop_path
                && entry.path >= *stop
            {
                break;
            }

            self.list.push_from_one(
                DeltaStatus::Deleted,
                entry.metadata.mode,
                Some(&entry.oid),
                &entry.path,
            )?;
            self.cursor += 1;
        }

        Ok(())
    }
}
