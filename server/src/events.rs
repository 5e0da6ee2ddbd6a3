use std::vec::IntoIter;

use syncable_shared::{PropertyChange, SyncableId};

/// Everything the Server's Syncables reported during one
/// [`Server::update`](crate::Server::update).
pub struct ServerEvents {
    property_changes: Vec<(SyncableId, PropertyChange)>,
    batches_sent: usize,
    empty: bool,
}

impl Default for ServerEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            property_changes: Vec::new(),
            batches_sent: 0,
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// `process_updates` batches pushed to LinkSessions.
    pub fn batches_sent(&self) -> usize {
        self.batches_sent
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_property_change(&mut self, id: &SyncableId, change: PropertyChange) {
        self.property_changes.push((id.clone(), change));
        self.empty = false;
    }

    pub(crate) fn add_batches(&mut self, batches: usize) {
        self.batches_sent += batches;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// Property Change Event
/// `property_change_<key>` of a hosted Syncable, in mutation order.
pub struct PropertyChangedEvent;
impl ServerEvent for PropertyChangedEvent {
    type Iter = IntoIter<(SyncableId, PropertyChange)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.property_changes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.property_changes.is_empty()
    }
}
