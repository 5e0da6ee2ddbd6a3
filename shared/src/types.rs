use std::fmt;

use serde::{Deserialize, Serialize};

/// Count of mutations applied to a Syncable.
pub type Version = u64;
/// Ordering token shared by every queue of one Syncable.
pub type QueueCounter = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

impl HostType {
    pub fn invert(self) -> Self {
        match self {
            HostType::Server => HostType::Client,
            HostType::Client => HostType::Server,
        }
    }

    /// The Server is the only side whose mutations are logged and replicated.
    pub fn is_authoritative(self) -> bool {
        self == HostType::Server
    }
}

// SessionKey
/// Identifies the transport session (e.g. an HTTP session) a Syncable is
/// scoped to on the Server.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// RequestId
/// Correlates a `demand` on a Link with its response.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}
