use std::collections::HashMap;

use crate::error::CoreError;
use crate::record::{IdentityRecord, decode_records};

/// Online-mode uuid, exactly as written in the whitelist, to its record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityIndex {
    by_uuid: HashMap<String, IdentityRecord>,
}

impl IdentityIndex {
    /// Later records win when two share a uuid.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = IdentityRecord>,
    {
        let mut by_uuid = HashMap::new();
        for record in records {
            by_uuid.insert(record.uuid.clone(), record);
        }
        Self { by_uuid }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        Ok(Self::build(decode_records(bytes)?))
    }

    pub fn get(&self, uuid: &str) -> Option<&IdentityRecord> {
        self.by_uuid.get(uuid)
    }

    pub fn len(&self) -> usize {
        self.by_uuid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uuid.is_empty()
    }
}
