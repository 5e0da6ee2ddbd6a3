use std::default::Default;

use syncable_shared::SyncConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Debounce settings cloned into every hosted Syncable
    pub sync: SyncConfig,
    /// Whether a link naming a Syncable the Server no longer hosts should
    /// first try the type's recreation hook before being refused.
    pub recreate_missing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            recreate_missing: true,
        }
    }
}
