use std::fmt;

use serde::{Deserialize, Serialize};

const ID_BYTES: usize = 16;

// SyncableId
/// 16 random bytes, hex encoded. Generated once per Syncable and never
/// changed afterwards.
#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncableId(String);

impl SyncableId {
    pub fn generate() -> Self {
        let mut id = String::with_capacity(ID_BYTES * 2);
        for _ in 0..ID_BYTES {
            id.push_str(&format!("{:02x}", fastrand::u8(..)));
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SyncableId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SyncableId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SyncableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
