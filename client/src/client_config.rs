use std::{default::Default, time::Duration};

use syncable_shared::SyncConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub sync: SyncConfig,
    /// How long an upstream call may wait for its response before it fails
    /// with a timeout
    pub upstream_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}
