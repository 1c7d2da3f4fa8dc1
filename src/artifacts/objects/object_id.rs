//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings uniquely identifying all
//! content objects (blobs and trees).
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123")
//!
//! The all-zero ID is reserved as the null ID and marks an absent side of a
//! delta or a hash that was never computed.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, SHORT_OID_LENGTH};
use std::io;

const ZERO_OID_RAW: &str = "0000000000000000000000000000000000000000";

/// Object identifier (SHA-1 hash)
///
/// A 40-character hexadecimal string that uniquely identifies an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if invalid length/characters
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id))
    }

    /// The null object ID (all zeros), marking an absent or uncomputed hash
    pub fn zero() -> Self {
        Self(ZERO_OID_RAW.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_OID_RAW
    }

    /// Write the object ID in binary format (20 bytes)
    ///
    /// Converts the 40-char hex string to 20 raw bytes. Used when hashing
    /// tree objects, whose entries embed child IDs in binary form.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        // Process a nibble pair at a time
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Get abbreviated form of the object ID
    ///
    /// # Returns
    ///
    /// First 7 characters of the hash (standard abbreviation)
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(SHORT_OID_LENGTH).0.to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::zero()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
