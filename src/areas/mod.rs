//! Collaborating areas of the repository
//!
//! The diff core consumes these through narrow interfaces: the object
//! database for blob/tree lookup and hashing, the index as a sorted array,
//! the workspace for directory enumeration and stat snapshots, and the
//! ignore/attribute engines for per-path policy.

pub mod attributes;
pub mod database;
pub mod ignores;
pub mod index;
pub mod repository;
pub mod workspace;

/// Glob match where `*` and `?` never cross a path separator
///
/// Shared by the ignore and attribute engines, whose pattern languages agree
/// on this subset.
pub(crate) fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (Some(b'*'), _) => {
            wildcard_match(&pattern[1..], text)
                || (!text.is_empty() && text[0] != b'/' && wildcard_match(pattern, &text[1..]))
        }
        (Some(b'?'), Some(&c)) if c != b'/' => wildcard_match(&pattern[1..], &text[1..]),
        (Some(&p), Some(&c)) if p == c => wildcard_match(&pattern[1..], &text[1..]),
        _ => false,
    }
}
