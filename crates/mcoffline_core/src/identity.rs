//! Offline-mode player identities.
//!
//! A server running without authentication cannot ask the session service
//! for a player's UUID, so it derives one from the name instead: the MD5 of
//! `"OfflinePlayer:" + name`, stamped as a version 3 (name-based) UUID.

use md5::{Digest, Md5};
use uuid::{Builder, Uuid};

const OFFLINE_NAME_PREFIX: &str = "OfflinePlayer:";

/// Derive the offline-mode UUID for a player name.
pub fn offline_uuid(name: &str) -> Uuid {
    let mut hasher = Md5::new();
    hasher.update(OFFLINE_NAME_PREFIX.as_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Builder::from_md5_bytes(bytes).into_uuid()
}

/// [`offline_uuid`] in canonical lowercase hyphenated form.
pub fn offline_uuid_string(name: &str) -> String {
    offline_uuid(name).hyphenated().to_string()
}
