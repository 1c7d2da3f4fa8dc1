//! Blob object
//!
//! Blobs store raw file content. They carry no metadata like filename or
//! permissions (those live in trees and in the index).
//!
//! ## Hashing
//!
//! A blob hashes as `blob <size>\0<content>`, so two files with identical
//! bytes always share an object ID.

use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};

/// Blob object representing file content
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    /// Raw file content
    content: Bytes,
}

impl Blob {
    pub fn from_bytes(content: impl Into<Bytes>) -> Self {
        Self::new(content.into())
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Compute the content-addressed ID of this blob
    pub fn object_id(&self) -> anyhow::Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", self.content.len()).as_bytes());
        hasher.update(&self.content);

        ObjectId::try_parse(format!("{:x}", hasher.finalize()))
    }
}
