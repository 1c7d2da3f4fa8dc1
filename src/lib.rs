//! Diff core of a simple git implementation
//!
//! Computes differences between any two of three content sources (a
//! committed tree object, the staged index, or the working directory) and
//! presents them either as a structured list of deltas or as a textual
//! patch, byte-compatible with the canonical unified-diff format.
//!
//! ## Entry points
//!
//! - [`tree_to_tree`]: compare two tree objects
//! - [`index_to_tree`]: compare the staged index against a tree
//! - [`workdir_to_index`]: compare the working directory against the index
//! - [`diff_blobs`]: compare two blobs directly
//! - [`DeltaList::foreach`]: walk a result with file/hunk/line callbacks
//! - [`DeltaList::print_compact`] / [`DeltaList::print_patch`]: render
//!
//! ```no_run
//! use bit_diff::{Repository, workdir_to_index};
//!
//! # fn main() -> anyhow::Result<()> {
//! let repo = Repository::new(std::path::Path::new("."))?;
//! let mut diff = workdir_to_index(&repo, None)?;
//! diff.print_compact(&mut |_origin, line| {
//!     print!("{}", String::from_utf8_lossy(line));
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;

pub use areas::database::Database;
pub use areas::index::Index;
pub use areas::repository::Repository;
pub use artifacts::index::index_entry::{EntryMetadata, IndexEntry};
pub use artifacts::diff::delta::{Delta, DeltaStatus};
pub use artifacts::diff::delta_list::DeltaList;
pub use artifacts::diff::options::{DiffFlags, DiffOptions, Prefix};
pub use artifacts::diff::patch::{DiffRange, LineOrigin, diff_blobs};
pub use artifacts::diff::{DiffError, index_to_tree, tree_to_tree, workdir_to_index};
pub use artifacts::objects::blob::Blob;
pub use artifacts::objects::entry_mode::{EntryMode, FileMode};
pub use artifacts::objects::object_id::ObjectId;
pub use artifacts::objects::tree::{Tree, TreeEntry};
