use std::vec::IntoIter;

use serde_json::Value;

use syncable_shared::{ErrorMessage, RequestId, SyncableId};

use crate::UpstreamError;

/// Outcome of an upstream call, surfaced from [`Client::update`](crate::Client::update)
/// or when its response arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    pub syncable: SyncableId,
    pub request_id: RequestId,
    pub result: Result<Value, UpstreamError>,
}

pub struct ClientEvents {
    errors: Vec<(SyncableId, ErrorMessage)>,
    responses: Vec<UpstreamResult>,
    empty: bool,
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            errors: Vec::new(),
            responses: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_error(&mut self, id: &SyncableId, message: ErrorMessage) {
        self.errors.push((id.clone(), message));
        self.empty = false;
    }

    pub(crate) fn push_response(
        &mut self,
        id: &SyncableId,
        request_id: RequestId,
        result: Result<Value, UpstreamError>,
    ) {
        self.responses.push(UpstreamResult {
            syncable: id.clone(),
            request_id,
            result,
        });
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

// Error Event
/// `error` events sent by the Server, e.g. `SYNCABLE_NOT_FOUND`.
pub struct ErrorEvent;
impl ClientEvent for ErrorEvent {
    type Iter = IntoIter<(SyncableId, ErrorMessage)>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.errors.is_empty()
    }
}

// Response Event
pub struct ResponseEvent;
impl ClientEvent for ResponseEvent {
    type Iter = IntoIter<UpstreamResult>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.responses);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.responses.is_empty()
    }
}
