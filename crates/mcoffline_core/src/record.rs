use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{CoreError, CoreErrorCode};

/// One entry of `whitelist.json` or `ops.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub level: i64,
    #[serde(
        rename = "bypassPlayerLimit",
        default,
        skip_serializing_if = "is_false"
    )]
    pub bypass_player_limit: bool,
    /// Fields this tool does not interpret, kept in their original order.
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl IdentityRecord {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            level: 0,
            bypass_player_limit: false,
            extra: JsonMap::new(),
        }
    }
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

pub fn decode_records(bytes: &[u8]) -> Result<Vec<IdentityRecord>, CoreError> {
    serde_json::from_slice(bytes).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Decode,
            format!("invalid player list json: {e}"),
        )
    })
}

/// Write records as a 2-space indented JSON array followed by a newline,
/// which is how the server itself writes these lists.
pub fn encode_records<W: Write>(records: &[IdentityRecord], mut out: W) -> Result<(), CoreError> {
    serde_json::to_writer_pretty(&mut out, records).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed writing player list json: {e}"),
        )
    })?;
    out.write_all(b"\n")
        .and_then(|()| out.flush())
        .map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed writing player list json: {e}"),
            )
        })
}
