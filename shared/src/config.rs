//! # `SyncConfig` – tuning knobs shared by both sides
//!
//! Set once when a Server or Client is constructed and cloned into every
//! Syncable it creates. No run-time mutation is allowed.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long the Server waits after the latest mutation of a Syncable
    /// before pushing pending log entries to its LinkSessions. Mutations made
    /// within this window travel in a single `process_updates` batch.
    pub broadcast_debounce: Duration,
    /// How long queue deliveries are held (and re-armed) before being sorted
    /// by their global counter and invoked.
    pub queue_delivery_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            broadcast_debounce: Duration::from_millis(10),
            queue_delivery_debounce: Duration::from_millis(10),
        }
    }
}
