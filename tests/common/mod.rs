#![allow(dead_code)]

use assert_fs::TempDir;
use bit_diff::{
    DeltaList, EntryMetadata, EntryMode, IndexEntry, LineOrigin, Repository, Tree, TreeEntry,
};
use std::collections::BTreeMap;
use std::path::Path;

/// A repository rooted in a fresh temporary directory
///
/// The temp dir must outlive the repository, so both are returned.
pub fn empty_repository() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::new(dir.path()).unwrap();

    (dir, repo)
}

/// Build (and store) a tree from `(path, content, mode)` triples
///
/// Nested paths become nested trees; every blob and subtree lands in the
/// repository's database so diff synthesis and patch printing can load them.
pub fn build_tree(repo: &mut Repository, files: &[(&str, &str, EntryMode)]) -> Tree {
    let files = files
        .iter()
        .map(|(path, content, mode)| (path.to_string(), content.to_string(), *mode))
        .collect();

    build_tree_level(repo, files)
}

fn build_tree_level(repo: &mut Repository, files: Vec<(String, String, EntryMode)>) -> Tree {
    let mut entries = Vec::new();
    let mut subdirs: BTreeMap<String, Vec<(String, String, EntryMode)>> = BTreeMap::new();

    for (path, content, mode) in files {
        match path.split_once('/') {
            None => {
                let oid = repo
                    .database_mut()
                    .store_blob(content.into_bytes())
                    .unwrap();
                entries.push(TreeEntry::new(path, mode, oid));
            }
            Some((dir, rest)) => subdirs
                .entry(dir.to_string())
                .or_default()
                .push((rest.to_string(), content, mode)),
        }
    }

    for (name, children) in subdirs {
        let subtree = build_tree_level(repo, children);
        let oid = repo.database_mut().store_tree(subtree).unwrap();
        entries.push(TreeEntry::new(name, EntryMode::Directory, oid));
    }

    Tree::new(entries)
}

/// Stage a blob directly, without touching the filesystem
pub fn stage_blob(repo: &mut Repository, path: &str, content: &str, mode: EntryMode) {
    let oid = repo
        .database_mut()
        .store_blob(content.to_string().into_bytes())
        .unwrap();
    let metadata = EntryMetadata {
        mode,
        size: content.len() as u64,
        ..Default::default()
    };

    repo.index_mut()
        .add(IndexEntry::new(path.to_string(), oid, metadata));
}

/// Stage an existing workdir file, recording its real stat snapshot
///
/// The content also lands in the database so patch output can load it.
pub fn stage_file(repo: &mut Repository, rel_path: &str) {
    let full_path = repo.workspace().absolute(rel_path);
    let metadata = std::fs::symlink_metadata(&full_path).unwrap();
    let stat: EntryMetadata = (full_path.as_path(), metadata).try_into().unwrap();

    let content: Vec<u8> = if stat.mode.is_symlink() {
        std::fs::read_link(&full_path)
            .unwrap()
            .to_string_lossy()
            .into_owned()
            .into_bytes()
    } else {
        std::fs::read(&full_path).unwrap()
    };
    let oid = repo.database_mut().store_blob(content).unwrap();

    repo.index_mut()
        .add(IndexEntry::new(rel_path.to_string(), oid, stat));
}

/// Stage a workdir file with zeroed timestamps, forcing the rehash path
pub fn stage_file_with_stale_times(repo: &mut Repository, rel_path: &str) {
    stage_file(repo, rel_path);

    let entry = repo
        .index()
        .entries()
        .iter()
        .find(|entry| entry.path == rel_path)
        .cloned()
        .unwrap();
    let mut stale = entry.metadata.clone();
    stale.ctime = 0;
    stale.mtime = 0;

    repo.index_mut()
        .add(IndexEntry::new(entry.path, entry.oid, stale));
}

pub fn write_file(root: &Path, rel_path: &str, content: &str) {
    let full_path = root.join(rel_path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full_path, content).unwrap();
}

#[cfg(unix)]
pub fn set_executable(root: &Path, rel_path: &str, executable: bool) {
    use std::os::unix::fs::PermissionsExt;

    let full_path = root.join(rel_path);
    let mode = if executable { 0o755 } else { 0o644 };
    std::fs::set_permissions(&full_path, std::fs::Permissions::from_mode(mode)).unwrap();
}

/// Collect compact output into one string
pub fn compact_output(list: &mut DeltaList<'_>) -> String {
    let mut out = Vec::new();
    list.print_compact(&mut |_origin: LineOrigin, line: &[u8]| {
        out.extend_from_slice(line);
        Ok(())
    })
    .unwrap();

    String::from_utf8(out).unwrap()
}

/// Collect unified-patch output into one string
pub fn patch_output(list: &mut DeltaList<'_>) -> String {
    let mut out = Vec::new();
    list.print_patch(&mut |_origin: LineOrigin, line: &[u8]| {
        out.extend_from_slice(line);
        Ok(())
    })
    .unwrap();

    String::from_utf8(out).unwrap()
}

/// Short form of the id a blob with this content would get
pub fn short_blob_oid(content: &str) -> String {
    bit_diff::Blob::from_bytes(content.to_string().into_bytes())
        .object_id()
        .unwrap()
        .to_short_oid()
}
