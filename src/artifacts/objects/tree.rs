//! Tree object
//!
//! Trees represent directory snapshots. Each entry maps a name to a mode and
//! an object ID; blob entries are files, tree entries are subdirectories and
//! gitlink entries reference nested repositories by commit.
//!
//! ## Ordering
//!
//! Entries are kept in git name order: directories sort as `name + "/"`, so
//! `x.txt` sorts before a directory `x`. This matches the byte-wise order of
//! index paths and keeps synthesized delta lists ascending by full path.
//!
//! ## Hashing
//!
//! A tree hashes as `tree <size>\0` followed by one `<mode> <name>\0<raw-id>`
//! record per entry, the same shape git stores on disk.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::io::Write;

/// One named entry of a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Key under which this entry sorts inside its tree
    ///
    /// Directories compare as `name + "/"`, mirroring git's tree order.
    pub fn sort_key(&self) -> String {
        if self.mode.is_tree() {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Tree object representing one directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by_key(|entry| entry.sort_key());
        Tree { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Compute the content-addressed ID of this tree
    pub fn object_id(&self) -> anyhow::Result<ObjectId> {
        let mut body = Vec::new();
        for entry in &self.entries {
            write!(body, "{} {}\0", entry.mode.as_str(), entry.name)?;
            entry.oid.write_raw_to(&mut body)?;
        }

        let mut hasher = Sha1::new();
        hasher.update(format!("tree {}\0", body.len()).as_bytes());
        hasher.update(&body);

        ObjectId::try_parse(format!("{:x}", hasher.finalize()))
    }
}
