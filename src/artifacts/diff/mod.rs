//! Diff core
//!
//! Computes differences between any two of three content sources (a
//! committed tree, the staged index, or the working directory) and renders
//! them as a structured delta list or as a textual patch.
//!
//! ## Pipeline
//!
//! One of the synthesizers populates a [`DeltaList`](delta_list::DeltaList);
//! the caller either iterates it directly or drives it through
//! [`foreach`](delta_list::DeltaList::foreach), which feeds each modified
//! delta's blob content through the Myers text engine and relays hunk and
//! line emissions to callbacks. The compact and patch printers are thin
//! adapters over that traversal.

pub mod binary;
pub mod delta;
pub mod delta_list;
pub mod diff_algorithm;
pub mod index_diff;
pub mod options;
pub mod patch;
pub mod print;
pub mod tree_diff;
pub mod workdir_diff;

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use self::delta_list::DeltaList;
use self::options::DiffOptions;
use thiserror::Error;

/// Core error kinds of the diff subsystem
///
/// Public operations return `anyhow::Result`; these are the typed causes a
/// caller can downcast to.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("object {oid} not found")]
    NotFound { oid: ObjectId },
    #[error("filesystem operation failed")]
    Os(#[source] std::io::Error),
    #[error("malformed hunk header: {header}")]
    Parse { header: String },
    #[error("diff callback requested abort")]
    Aborted(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Compare two trees
///
/// Produces one delta per differing blob, in ascending path order. Tree to
/// non-tree transitions surface as a Deleted plus an Added delta.
pub fn tree_to_tree<'r>(
    repo: &'r Repository,
    opts: Option<&DiffOptions>,
    old_tree: &Tree,
    new_tree: &Tree,
) -> anyhow::Result<DeltaList<'r>> {
    let mut list = DeltaList::new(repo, DiffOptions::resolved(opts));
    tree_diff::TreeDiffer::new(&mut list).run(old_tree, new_tree)?;

    Ok(list)
}

/// Compare the index against a tree
///
/// The tree is the "old" side; index-only entries come out Added, tree-only
/// entries Deleted.
pub fn index_to_tree<'r>(
    repo: &'r Repository,
    opts: Option<&DiffOptions>,
    old_tree: &Tree,
) -> anyhow::Result<DeltaList<'r>> {
    let mut list = DeltaList::new(repo, DiffOptions::resolved(opts));
    index_diff::IndexTreeDiffer::new(&mut list).run(old_tree)?;

    Ok(list)
}

/// Compare the working directory against the index
///
/// The index is the "old" side. Workdir-only entries classify as Untracked
/// or Ignored; suspected modifications are confirmed by rehashing.
pub fn workdir_to_index<'r>(
    repo: &'r Repository,
    opts: Option<&DiffOptions>,
) -> anyhow::Result<DeltaList<'r>> {
    let mut list = DeltaList::new(repo, DiffOptions::resolved(opts));
    workdir_diff::WorkdirDiffer::new(&mut list).run()?;

    Ok(list)
}
