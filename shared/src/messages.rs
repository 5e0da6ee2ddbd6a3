//! Message shapes exchanged over a [`Link`](crate::Link).
//!
//! | Event | Direction | Payload |
//! |-------|-----------|---------|
//! | out-of-band attach    | client → server | [`HandshakeConfig`] |
//! | `process_updates`     | server → client | [`UpdateBatch`] |
//! | `upstream-method`     | client → server (demand) | [`UpstreamRequest`], answered with [`UpstreamResponse`] |
//! | `error`               | server → client | [`ErrorMessage`] |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LogEntry, SyncableId, Version};

pub const PROCESS_UPDATES_EVENT: &str = "process_updates";
pub const UPSTREAM_METHOD_EVENT: &str = "upstream-method";
pub const ERROR_EVENT: &str = "error";

pub const SYNCABLE_NOT_FOUND: &str = "SYNCABLE_NOT_FOUND";

/// Sent by a replica when it opens its link: which Syncable it mirrors and
/// which version it already has.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: SyncableId,
    #[serde(default)]
    pub version: Version,
}

impl HandshakeConfig {
    pub fn new(type_name: &str, id: &SyncableId, version: Version) -> Self {
        Self {
            type_name: type_name.to_string(),
            id: id.clone(),
            version,
        }
    }
}

/// Log entries a LinkSession had not acknowledged yet, plus the version the
/// Syncable is at after them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatch {
    pub updates: Vec<LogEntry>,
    pub version: Version,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
}

impl ErrorMessage {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: SYNCABLE_NOT_FOUND.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == SYNCABLE_NOT_FOUND
    }
}

/// `(method_name, args)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest(pub String, pub Vec<Value>);

/// `(error | null, result)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse(pub Option<String>, pub Value);

impl UpstreamResponse {
    pub fn ok(result: Value) -> Self {
        Self(None, result)
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self(Some(message.into()), Value::Null)
    }

    pub fn into_result(self) -> Result<Value, String> {
        match self.0 {
            Some(error) => Err(error),
            None => Ok(self.1),
        }
    }
}
