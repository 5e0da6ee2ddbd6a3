use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{QueueMessage, SyncableId, Version};

/// Buffered messages of one queue. Listeners are never serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DryQueue {
    #[serde(default)]
    pub messages: Vec<QueueMessage>,
}

/// Snapshot used to (re)hydrate a replica. The log is never part of it;
/// history the replica lacks arrives through catch-up once its link is
/// attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrySyncable {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: SyncableId,
    pub version: Version,
    #[serde(default)]
    pub state: BTreeMap<String, Value>,
    #[serde(default)]
    pub queues: BTreeMap<String, DryQueue>,
}
