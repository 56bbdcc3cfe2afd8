//! Table encoding. A whole table is one JSON object: `{ key: value, ... }`.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON codec for a complete table, optionally pretty-printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON, easier to read and diff by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// `true` if this codec indents its output.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Encode the full table.
    pub fn encode<K, V>(&self, table: &BTreeMap<K, V>) -> Result<Vec<u8>>
    where
        K: Serialize,
        V: Serialize,
    {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(table)
        } else {
            serde_json::to_vec(table)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Decode file contents into a table. Empty or whitespace-only input is
    /// an empty table; anything else must be a complete JSON object of the
    /// expected shape.
    pub fn decode<K, V>(&self, bytes: &[u8]) -> Result<BTreeMap<K, V>>
    where
        K: DeserializeOwned + Ord,
        V: DeserializeOwned,
    {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
