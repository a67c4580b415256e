//! Cache Key Module
//!
//! Turns caller keys into filesystem-safe identifiers.

use std::fmt;

use sha1::{Digest, Sha1};

use crate::error::Result;

// == Cache Identifier ==
/// Hashed form of a caller key: 40 lower-case hex characters.
///
/// Used both as the memory tier key and as the entry file name, so it never
/// contains path separators or reserved characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheIdentifier(String);

impl CacheIdentifier {
    // == From Key ==
    /// Hashes a caller key with SHA-1.
    ///
    /// The algorithm must stay fixed for the lifetime of a cache directory:
    /// changing it orphans every file written before.
    ///
    /// Every string, the empty one included, has a digest, so this never
    /// fails today. A fallible transform would report `InvalidKey` here and
    /// callers propagate it before touching either tier.
    pub fn from_key(key: &str) -> Result<Self> {
        Ok(Self(hex::encode(Sha1::digest(key.as_bytes()))))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
