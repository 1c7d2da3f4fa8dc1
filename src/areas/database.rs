//! Object database
//!
//! Content-addressable storage for blobs and trees, identified by their
//! SHA-1 hash. The diff core uses it to look up tree and blob objects during
//! synthesis and patch generation, and to hash workdir content when a stat
//! suspicion needs confirming.
//!
//! ## Hashing
//!
//! Hashing is git-compatible: `blob <size>\0<content>` for file content and
//! symlink targets, `tree <size>\0<entries>` for trees. A file on disk and a
//! staged blob with the same bytes therefore always agree on their ID.

use crate::artifacts::diff::DiffError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;

/// Stored object variants
#[derive(Debug, Clone)]
enum StoredObject {
    Blob(Blob),
    Tree(Tree),
}

/// Object database
///
/// Manages storage and retrieval of content-addressable objects.
#[derive(Debug, Default)]
pub struct Database {
    objects: HashMap<ObjectId, StoredObject>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob, returning its content-addressed ID
    pub fn store_blob(&mut self, content: impl Into<Bytes>) -> anyhow::Result<ObjectId> {
        let blob = Blob::from_bytes(content);
        let oid = blob.object_id()?;
        self.objects.insert(oid.clone(), StoredObject::Blob(blob));

        Ok(oid)
    }

    /// Store a tree, returning its content-addressed ID
    pub fn store_tree(&mut self, tree: Tree) -> anyhow::Result<ObjectId> {
        let oid = tree.object_id()?;
        self.objects.insert(oid.clone(), StoredObject::Tree(tree));

        Ok(oid)
    }

    /// Look up a blob by ID
    pub fn blob(&self, oid: &ObjectId) -> anyhow::Result<&Blob> {
        match self.objects.get(oid) {
            Some(StoredObject::Blob(blob)) => Ok(blob),
            _ => Err(DiffError::NotFound { oid: oid.clone() }.into()),
        }
    }

    /// Look up a tree by ID
    pub fn tree(&self, oid: &ObjectId) -> anyhow::Result<&Tree> {
        match self.objects.get(oid) {
            Some(StoredObject::Tree(tree)) => Ok(tree),
            _ => Err(DiffError::NotFound { oid: oid.clone() }.into()),
        }
    }

    /// Hash raw bytes as a blob without storing them
    pub fn hash_blob(content: &[u8]) -> anyhow::Result<ObjectId> {
        Blob::from_bytes(Bytes::copy_from_slice(content)).object_id()
    }

    /// Hash a file's content as a blob without storing it
    pub fn hash_file(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let content = std::fs::read(path)
            .map_err(DiffError::Os)
            .with_context(|| format!("Could not open '{}'", path.display()))?;

        Self::hash_blob(&content)
    }

    /// Hash a symlink's target string as a blob without storing it
    pub fn hash_symlink(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let target = std::fs::read_link(path)
            .map_err(DiffError::Os)
            .with_context(|| format!("Could not read link '{}'", path.display()))?;

        Self::hash_blob(target.to_string_lossy().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::objects::tree::TreeEntry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_store_and_look_up_blob() {
        let mut database = Database::new();
        let oid = database.store_blob("hello\n").unwrap();

        let blob = database.blob(&oid).unwrap();
        assert_eq!(blob.content().as_ref(), b"hello\n");
    }

    #[rstest]
    fn test_store_and_look_up_tree() {
        let mut database = Database::new();
        let blob_oid = database.store_blob("hello\n").unwrap();
        let tree = Tree::new(vec![TreeEntry::new(
            "hello.txt".to_string(),
            EntryMode::File(FileMode::Regular),
            blob_oid,
        )]);
        let tree_oid = database.store_tree(tree.clone()).unwrap();

        assert_eq!(*database.tree(&tree_oid).unwrap(), tree);
    }

    #[rstest]
    fn test_missing_object_is_not_found() {
        let database = Database::new();
        let error = database.blob(&ObjectId::zero()).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<DiffError>(),
            Some(DiffError::NotFound { .. })
        ));
    }

    #[rstest]
    fn test_hash_file_matches_stored_blob() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello\n").unwrap();

        let mut database = Database::new();
        let stored = database.store_blob("hello\n").unwrap();
        let hashed = database.hash_file(&path).unwrap();

        assert_eq!(stored, hashed);
    }
}
