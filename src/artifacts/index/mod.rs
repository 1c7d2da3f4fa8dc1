//! Index entry representation
//!
//! The index (staging area) is consumed by the diff core as a sorted array of
//! entries, each pairing a path with a content hash and the stat metadata
//! that enables change detection without rereading file content.

pub mod index_entry;

/// Maximum path length recorded in an entry's flags
pub const MAX_PATH_SIZE: usize = 4095;
