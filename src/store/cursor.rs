//! # Pagination Cursor
//!
//! Opaque continuation token handed to clients by a paginated list and
//! echoed back unchanged to fetch the next page.
//!
//! Token layout before base64 (URL-safe, unpadded):
//! `[crc32 of payload: u32 BE][payload: JSON object with the start key]`.
//! The checksum rejects truncated or hand-edited tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use crc32fast::Hasher;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use super::table::KEY_ATTRIBUTE;

const CHECKSUM_LEN: usize = 4;

/// Token could not be decoded or failed its checksum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid pagination cursor")]
pub struct InvalidCursor;

/// A decoded continuation token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    token: String,
    start_key: String,
}

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

impl Cursor {
    /// Build the token that resumes a scan after `start_key`
    pub(crate) fn for_key(start_key: impl Into<String>) -> Self {
        let start_key = start_key.into();

        let mut payload = Map::new();
        payload.insert(KEY_ATTRIBUTE.to_string(), Value::String(start_key.clone()));
        let payload = Value::Object(payload).to_string().into_bytes();

        let mut raw = Vec::with_capacity(CHECKSUM_LEN + payload.len());
        raw.extend_from_slice(&checksum(&payload).to_be_bytes());
        raw.extend_from_slice(&payload);

        Self {
            token: URL_SAFE_NO_PAD.encode(raw),
            start_key,
        }
    }

    /// Decode a token received from a client
    pub fn parse(token: &str) -> Result<Self, InvalidCursor> {
        let raw = URL_SAFE_NO_PAD.decode(token).map_err(|_| InvalidCursor)?;
        if raw.len() <= CHECKSUM_LEN {
            return Err(InvalidCursor);
        }

        let (sum, payload) = raw.split_at(CHECKSUM_LEN);
        let expected = u32::from_be_bytes([sum[0], sum[1], sum[2], sum[3]]);
        if checksum(payload) != expected {
            return Err(InvalidCursor);
        }

        let value: Value = serde_json::from_slice(payload).map_err(|_| InvalidCursor)?;
        let start_key = value
            .get(KEY_ATTRIBUTE)
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or(InvalidCursor)?;

        Ok(Self {
            token: token.to_string(),
            start_key: start_key.to_string(),
        })
    }

    /// The token as sent over the wire
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub(crate) fn start_key(&self) -> &str {
        &self.start_key
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token)
    }
}
