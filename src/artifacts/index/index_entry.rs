//! Index entry and its stat metadata
//!
//! Each entry represents one tracked file: its repository-relative path, the
//! hash of its staged content, and a snapshot of the filesystem stat fields
//! taken when the content was staged.
//!
//! ## Change detection
//!
//! The stat snapshot lets the workdir synthesizer detect changes cheaply:
//! a size or mode difference is conclusive on its own, while a difference in
//! any of the cached times or ownership fields only marks the entry as
//! suspect and triggers a content rehash.

use crate::artifacts::index::MAX_PATH_SIZE;
use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Index entry representing a tracked file
#[derive(Debug, Clone, Default)]
pub struct IndexEntry {
    /// File path relative to the repository root
    pub path: String,
    /// Hash of the staged file content
    pub oid: ObjectId,
    /// Stat snapshot taken at staging time
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn new(path: String, oid: ObjectId, mut metadata: EntryMetadata) -> Self {
        metadata.flags = min(path.len(), MAX_PATH_SIZE) as u32;

        IndexEntry {
            path,
            oid,
            metadata,
        }
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

/// File metadata stored in index entries
///
/// Contains the stat fields the workdir synthesizer compares against a fresh
/// `lstat`: size and canonical mode (conclusive), plus timestamps, device,
/// inode and ownership (suspicion only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// Canonical file mode
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
    /// Entry flags (path length, capped)
    pub flags: u32,
}

impl EntryMetadata {
    /// True when the conclusive stat fields match a fresh observation
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        self.size == other.size && self.mode == other.mode
    }

    /// True when the cached suspicion fields match a fresh observation
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.ctime == other.ctime
            && self.mtime == other.mtime
            && self.dev == other.dev
            && self.ino == other.ino
            && self.uid == other.uid
            && self.gid == other.gid
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let file_type = metadata.file_type();
        let mode = if file_type.is_symlink() {
            EntryMode::Symlink
        } else if file_type.is_dir() {
            EntryMode::Directory
        } else if file_type.is_file() {
            match file_path.is_executable() {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        } else {
            // fifos, sockets and devices cannot be tracked
            EntryMode::Absent
        };

        Ok(Self {
            ctime: metadata.ctime(),
            mtime: metadata.mtime(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            flags: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn metadata() -> EntryMetadata {
        EntryMetadata {
            size: 4,
            mode: EntryMode::File(FileMode::Regular),
            mtime: 100,
            ..Default::default()
        }
    }

    #[rstest]
    fn test_entry_orders_by_path(metadata: EntryMetadata) {
        let a = IndexEntry::new("a.txt".to_string(), ObjectId::zero(), metadata.clone());
        let b = IndexEntry::new("b/c.txt".to_string(), ObjectId::zero(), metadata);

        assert!(a < b);
    }

    #[rstest]
    fn test_entry_flags_record_path_length(metadata: EntryMetadata) {
        let entry = IndexEntry::new("a/b/c".to_string(), ObjectId::zero(), metadata);

        assert_eq!(entry.metadata.flags, 5);
    }

    #[rstest]
    fn test_stat_match_is_conclusive_on_size_and_mode(metadata: EntryMetadata) {
        let mut other = metadata.clone();
        assert!(metadata.stat_match(&other));

        other.size = 5;
        assert!(!metadata.stat_match(&other));

        other.size = metadata.size;
        other.mode = EntryMode::File(FileMode::Executable);
        assert!(!metadata.stat_match(&other));
    }

    #[rstest]
    fn test_times_match_covers_suspicion_fields(metadata: EntryMetadata) {
        let mut other = metadata.clone();
        assert!(metadata.times_match(&other));

        other.mtime = 101;
        assert!(!metadata.times_match(&other));
    }
}
