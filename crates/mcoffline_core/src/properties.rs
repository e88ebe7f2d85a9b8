//! Minimal reader for `server.properties`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CoreError, CoreErrorCode};

pub const LEVEL_NAME_KEY: &str = "level-name";

/// Value of the first `key=value` line whose key is `key`.
pub fn read_value(path: &Path, key: &str) -> Result<String, CoreError> {
    let file = File::open(path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to open {}: {e}", path.display()),
        )
    })?;
    find_value(BufReader::new(file), key)
        .map_err(|e| e.context(path.display().to_string()))?
        .ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::KeyNotFound,
                format!("{key} not found in {}", path.display()),
            )
        })
}

/// Scan `reader` for `key`. Lines without an `=`, or starting with one, are
/// ignored; keys and values are trimmed.
///
/// Properties files are not guaranteed to be UTF-8 (a Latin-1 `motd` is
/// common), so lines are decoded lossily.
pub fn find_value<R: BufRead>(reader: R, key: &str) -> Result<Option<String>, CoreError> {
    for raw in reader.split(b'\n') {
        let raw = raw.map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("failed reading properties: {e}"))
        })?;
        let line = String::from_utf8_lossy(&raw);
        let Some(eq) = line.find('=') else {
            continue;
        };
        if eq < 1 {
            continue;
        }
        if line[..eq].trim() == key {
            return Ok(Some(line[eq + 1..].trim().to_string()));
        }
    }
    Ok(None)
}
