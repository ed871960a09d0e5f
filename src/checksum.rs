//! Canonical checksums for schema comparison

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::Result;
use crate::schema::Schema;
use crate::serializer::serialize;

/// SHA-256 hex digest of schema content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(data)))
    }

    /// Digest of raw text, formatting included
    pub fn of_text(content: &str) -> Self {
        Self::of_bytes(content.as_bytes())
    }

    /// Digest of the canonical serialization of `schema`.
    ///
    /// Texts that parse to the same layout and fields share this checksum
    /// whatever their formatting or key order.
    pub fn of_schema(schema: &Schema) -> Result<Self> {
        let canonical = serialize(&schema.layout, Some(&schema.fields))?;
        Ok(Self::of_text(&canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check raw text against this checksum
    pub fn verify(&self, content: &str) -> bool {
        Self::of_text(content) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}
