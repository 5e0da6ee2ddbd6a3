use serde_json::Value;

use crate::{update_log::log_entry::{LogEntry, UpdateKind}, Version};

/// Append-only mutation log of one Syncable.
///
/// `entries[v - 1]` is the mutation that advanced the Syncable from `v - 1`
/// to `v`, so `len() == version()` always holds. Nothing is ever removed,
/// which lets any LinkSession catch up by replay no matter how far behind it
/// is.
#[derive(Default)]
pub struct LogStore {
    entries: Vec<LogEntry>,
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn version(&self) -> Version {
        self.entries.len() as Version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a new entry and returns the version it produced.
    pub fn append(&mut self, kind: UpdateKind, args: Vec<Value>) -> Version {
        let version = self.version() + 1;
        self.entries.push(LogEntry::new(version, kind, args));
        version
    }

    /// Returns `log[ack_version..]`, or an empty slice when `ack_version` is
    /// already at (or past) the current version.
    pub fn entries_since(&self, ack_version: Version) -> &[LogEntry] {
        if ack_version >= self.version() {
            return &[];
        }
        &self.entries[ack_version as usize..]
    }

    pub fn get(&self, version: Version) -> Option<&LogEntry> {
        if version == 0 {
            return None;
        }
        self.entries.get((version - 1) as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }
}
