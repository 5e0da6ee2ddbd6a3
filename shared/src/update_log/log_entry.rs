use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Version;

/// Discriminates the semantic meaning of a [`LogEntry`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateKind {
    /// Set a property: `[key, value]`.
    Set,
    /// Run a method body: `[method_name, ...args]`.
    Call,
    /// Push onto a named queue: `[queue_name, ...args]`.
    PushQueue,
    /// Clear a named queue's buffer: `[queue_name]`.
    ClearQueue,
    /// Anything received over the wire that this build does not understand.
    /// Kept so the apply path can reject it.
    Unknown(String),
}

impl UpdateKind {
    pub fn as_str(&self) -> &str {
        match self {
            UpdateKind::Set => "set",
            UpdateKind::Call => "call",
            UpdateKind::PushQueue => "push_queue",
            UpdateKind::ClearQueue => "clear_queue",
            UpdateKind::Unknown(kind) => kind,
        }
    }
}

impl From<String> for UpdateKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "set" => UpdateKind::Set,
            "call" => UpdateKind::Call,
            "push_queue" => UpdateKind::PushQueue,
            "clear_queue" => UpdateKind::ClearQueue,
            _ => UpdateKind::Unknown(value),
        }
    }
}

impl From<UpdateKind> for String {
    fn from(value: UpdateKind) -> Self {
        match value {
            UpdateKind::Unknown(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation of a Syncable. `version` is the version the Syncable reached
/// by applying it. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub version: Version,
    pub kind: UpdateKind,
    pub args: Vec<Value>,
}

impl LogEntry {
    pub fn new(version: Version, kind: UpdateKind, args: Vec<Value>) -> Self {
        Self {
            version,
            kind,
            args,
        }
    }
}
