use std::vec::IntoIter;

use serde_json::Value;

/// A property of an authoritative Syncable took a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    pub key: String,
    pub value: Value,
}

impl PropertyChange {
    /// `property_change_<key>`
    pub fn event_name(&self) -> String {
        format!("property_change_{}", self.key)
    }
}

#[derive(Clone)]
pub struct SyncableEvents {
    property_changes: Vec<PropertyChange>,
    empty: bool,
}

impl Default for SyncableEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncableEvents {
    pub(crate) fn new() -> Self {
        Self {
            property_changes: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: SyncableEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: SyncableEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_property_change(&mut self, key: &str, value: Value) {
        self.property_changes.push(PropertyChange {
            key: key.to_string(),
            value,
        });
        self.empty = false;
    }
}

// Event Trait
pub trait SyncableEvent {
    type Iter;

    fn iter(events: &mut SyncableEvents) -> Self::Iter;

    fn has(events: &SyncableEvents) -> bool;
}

// Property Change Event
pub struct PropertyChangeEvent;
impl SyncableEvent for PropertyChangeEvent {
    type Iter = IntoIter<PropertyChange>;

    fn iter(events: &mut SyncableEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.property_changes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncableEvents) -> bool {
        !events.property_changes.is_empty()
    }
}
