use serde::Serialize;
use serde_json::Value;

use crate::{LinkError, RequestId};

/// A persistent bidirectional connection to one remote endpoint.
///
/// Outbound traffic goes through this trait. Inbound traffic is delivered by
/// the transport calling into the Server (`receive_demand`, `link_closed`) or
/// the Client (`receive_event`, `receive_response`).
pub trait Link {
    /// Fire-and-forget event.
    fn submit(&mut self, event: &str, payload: Value) -> Result<(), LinkError>;
    /// Request expecting one response, correlated by the returned id.
    fn demand(&mut self, event: &str, payload: Value) -> Result<RequestId, LinkError>;
    /// Answers a demand received from the remote end.
    fn respond(&mut self, request_id: RequestId, payload: Value) -> Result<(), LinkError>;
    fn destroy(&mut self);
    fn is_destroyed(&self) -> bool;
}

fn encode<T: Serialize>(event: &str, message: &T) -> Result<Value, LinkError> {
    serde_json::to_value(message).map_err(|err| LinkError::Serialize {
        event: event.to_string(),
        reason: err.to_string(),
    })
}

pub fn submit_message<T: Serialize>(
    link: &mut dyn Link,
    event: &str,
    message: &T,
) -> Result<(), LinkError> {
    let payload = encode(event, message)?;
    link.submit(event, payload)
}

pub fn demand_message<T: Serialize>(
    link: &mut dyn Link,
    event: &str,
    message: &T,
) -> Result<RequestId, LinkError> {
    let payload = encode(event, message)?;
    link.demand(event, payload)
}

pub fn respond_message<T: Serialize>(
    link: &mut dyn Link,
    request_id: RequestId,
    message: &T,
) -> Result<(), LinkError> {
    let payload = encode("response", message)?;
    link.respond(request_id, payload)
}
