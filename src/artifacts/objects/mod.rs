//! Git-style content objects: identifiers, entry modes, blobs and trees.

pub mod blob;
pub mod entry_mode;
pub mod object_id;
pub mod tree;

/// Length of a full hexadecimal object ID
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an abbreviated object ID
pub const SHORT_OID_LENGTH: usize = 7;
