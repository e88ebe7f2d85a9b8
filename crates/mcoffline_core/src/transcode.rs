use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{CoreError, CoreErrorCode};
use crate::identity::offline_uuid_string;
use crate::record::{IdentityRecord, decode_records, encode_records};

/// Replace every record's uuid with the one derived from its name.
///
/// Order and every other field are kept as-is; the server treats list order
/// as meaningful.
pub fn transcode(records: &[IdentityRecord]) -> Vec<IdentityRecord> {
    records
        .iter()
        .map(|record| IdentityRecord {
            uuid: offline_uuid_string(&record.name),
            ..record.clone()
        })
        .collect()
}

/// Read an online-mode player list from `input` and write the offline-mode
/// equivalent to `output`. Nothing is written if the input does not decode.
pub fn convert_json<R: Read, W: Write>(mut input: R, output: W) -> Result<(), CoreError> {
    let mut src = Vec::new();
    input.read_to_end(&mut src).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed reading player list: {e}"),
        )
    })?;
    let records = decode_records(&src)?;
    encode_records(&transcode(&records), output)
}

/// Convert an already-read player list and write it to `dest`.
///
/// Decoding happens before `dest` is created so a malformed list never
/// leaves a truncated output file behind.
pub fn write_offline_json(src: &[u8], dest: &Path) -> Result<usize, CoreError> {
    let records = decode_records(src)?;
    let offline = transcode(&records);

    let file = File::create(dest).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to create {}: {e}", dest.display()),
        )
    })?;
    encode_records(&offline, BufWriter::new(file))
        .map_err(|e| e.context(dest.display().to_string()))?;

    debug!(path = %dest.display(), records = offline.len(), "wrote offline player list");
    Ok(offline.len())
}
