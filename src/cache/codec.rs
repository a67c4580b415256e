//! Entry Codec Module
//!
//! Byte encoding of [`CacheEntry`] for the disk tier: a versioned JSON envelope.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::cache::{CacheEntry, ExpiresAfter};
use crate::error::{CacheError, Result};

/// Envelope version written by [`encode`]. Files carrying any other version
/// are treated as undecodable.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, V> {
    version: u32,
    key: &'a str,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_after: Option<ExpiresAfter>,
    payload: &'a V,
}

#[derive(Deserialize)]
struct Envelope<V> {
    key: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    expires_after: Option<ExpiresAfter>,
    payload: V,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

// == Encode ==
/// Serializes an entry into bytes.
///
/// # Errors
/// Returns `Encode` if the payload cannot be represented as JSON.
pub fn encode<V: Serialize>(entry: &CacheEntry<V>) -> Result<Vec<u8>> {
    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        key: &entry.original_key,
        created_at: entry.created_at,
        expires_after: entry.expires_after,
        payload: &entry.payload,
    };

    serde_json::to_vec(&envelope).map_err(|e| CacheError::Encode(e.to_string()))
}

// == Decode ==
/// Deserializes bytes produced by [`encode`].
///
/// # Errors
/// Returns `Decode` for truncated or foreign bytes, an unknown format
/// version, or a payload that does not match `V`.
pub fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<CacheEntry<V>> {
    let header: Header =
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;
    if header.version != FORMAT_VERSION {
        return Err(CacheError::Decode(format!(
            "unsupported format version {}",
            header.version
        )));
    }

    let envelope: Envelope<V> =
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;

    Ok(CacheEntry {
        original_key: envelope.key,
        payload: envelope.payload,
        created_at: envelope.created_at,
        expires_after: envelope.expires_after,
    })
}
