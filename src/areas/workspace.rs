//! Working directory
//!
//! The workspace enumerates the working copy one directory at a time: every
//! direntry is `lstat`ed, given a canonical mode, and, for directories,
//! suffixed with `/` so the resulting byte order matches the tree and index
//! conventions. Recursion into subdirectories is the synthesizer's call, not
//! the workspace's, because ignored and untracked directories must not be
//! descended into blindly.

use crate::artifacts::diff::DiffError;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::entry_mode::EntryMode;
use anyhow::Context;
use std::path::{Path, PathBuf};

const IGNORED_NAMES: [&str; 3] = [".git", ".", ".."];

/// Repository marker directory inside a nested checkout
const DOT_GIT: &str = ".git";

/// A single filesystem observation
///
/// Paths are repository-relative; directory paths carry a trailing `/`.
/// The stat snapshot's mode is already canonical.
#[derive(Debug, Clone)]
pub struct WorkdirEntry {
    pub path: String,
    pub stat: EntryMetadata,
}

impl WorkdirEntry {
    pub fn mode(&self) -> EntryMode {
        self.stat.mode
    }

    pub fn is_dir(&self) -> bool {
        self.stat.mode.is_tree()
    }
}

/// Working directory
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of a repository-relative path
    pub fn absolute(&self, rel_path: &str) -> PathBuf {
        self.path.join(rel_path.trim_end_matches('/'))
    }

    /// Enumerate one directory, sorted by path
    ///
    /// `dir` is repository-relative ("" for the root) and may carry the
    /// trailing `/` the workdir synthesizer tracks for directories.
    pub fn list_dir(&self, dir: &str) -> anyhow::Result<Vec<WorkdirEntry>> {
        let dir_path = self.absolute(dir);
        let prefix = if dir.is_empty() || dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{dir}/")
        };

        let mut entries = Vec::new();
        let listing = std::fs::read_dir(&dir_path)
            .map_err(DiffError::Os)
            .with_context(|| format!("Could not list directory '{}'", dir_path.display()))?;

        for dir_entry in listing {
            let dir_entry = dir_entry.map_err(DiffError::Os)?;
            let name = dir_entry.file_name();
            let name = name
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Non-UTF-8 file name in '{}'", prefix))?;

            if IGNORED_NAMES.contains(&name) {
                continue;
            }

            entries.push(self.stat_entry(&prefix, name)?);
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    /// lstat one direntry and build its canonical observation
    fn stat_entry(&self, prefix: &str, name: &str) -> anyhow::Result<WorkdirEntry> {
        let rel_path = format!("{prefix}{name}");
        let full_path = self.path.join(&rel_path);

        let metadata = std::fs::symlink_metadata(&full_path)
            .map_err(DiffError::Os)
            .with_context(|| format!("Could not stat '{}'", full_path.display()))?;
        let stat: EntryMetadata = (full_path.as_path(), metadata).try_into()?;

        // suffix directories with / to mimic tree/index sort order
        let path = if stat.mode.is_tree() {
            format!("{rel_path}/")
        } else {
            rel_path
        };

        Ok(WorkdirEntry { path, stat })
    }

    /// True when the directory holds a nested repository marker
    pub fn contains_repository(&self, dir: &str) -> bool {
        self.absolute(dir).join(DOT_GIT).exists()
    }
}
