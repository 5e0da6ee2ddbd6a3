use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{debug, warn};
use serde_json::Value;

use syncable_shared::{
    demand_message, Link, LinkError, RequestId, UpstreamRequest, UpstreamResponse,
    UPSTREAM_METHOD_EVENT,
};

use crate::UpstreamError;

struct PendingCall {
    method: String,
    deadline: Instant,
}

/// The replica's single link to the Server, and the upstream calls waiting
/// for an answer on it.
pub struct UpstreamGateway {
    link: Box<dyn Link>,
    timeout: Duration,
    pending: HashMap<RequestId, PendingCall>,
}

impl UpstreamGateway {
    pub fn new(link: Box<dyn Link>, timeout: Duration) -> Self {
        Self {
            link,
            timeout,
            pending: HashMap::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_destroyed()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Sends `method` upstream. The returned id identifies the eventual
    /// result.
    pub fn call(&mut self, method: String, args: Vec<Value>, now: Instant) -> Result<RequestId, UpstreamError> {
        let request = UpstreamRequest(method, args);
        let request_id = demand_message(self.link.as_mut(), UPSTREAM_METHOD_EVENT, &request)?;

        debug!("Upstream call `{}` sent as {:?}", request.0, request_id);
        self.pending.insert(
            request_id,
            PendingCall {
                method: request.0,
                deadline: now + self.timeout,
            },
        );

        Ok(request_id)
    }

    /// Resolves a pending call. Responses to calls that already timed out
    /// (or were never made) are discarded and yield `None`.
    pub fn receive_response(
        &mut self,
        request_id: RequestId,
        payload: Value,
    ) -> Option<Result<Value, UpstreamError>> {
        let Some(call) = self.pending.remove(&request_id) else {
            warn!("Discarding stale upstream response {:?}", request_id);
            return None;
        };

        let result = match serde_json::from_value::<UpstreamResponse>(payload) {
            Ok(response) => response.into_result().map_err(|message| UpstreamError::Remote {
                method: call.method,
                message,
            }),
            Err(err) => Err(UpstreamError::MalformedResponse {
                method: call.method,
                reason: err.to_string(),
            }),
        };
        Some(result)
    }

    /// Fails and forgets every call whose deadline has passed.
    pub fn collect_timeouts(&mut self, now: &Instant) -> Vec<(RequestId, UpstreamError)> {
        let expired: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|(_, call)| *now >= call.deadline)
            .map(|(request_id, _)| *request_id)
            .collect();

        let mut timeouts = Vec::with_capacity(expired.len());
        for request_id in expired {
            if let Some(call) = self.pending.remove(&request_id) {
                warn!("Upstream call `{}` timed out", call.method);
                timeouts.push((
                    request_id,
                    UpstreamError::Timeout {
                        method: call.method,
                        timeout: self.timeout,
                    },
                ));
            }
        }
        timeouts.sort_by_key(|(request_id, _)| *request_id);
        timeouts
    }

    /// Swaps in a freshly opened link. Calls made on the old one can never
    /// be answered and are failed.
    pub fn replace_link(&mut self, link: Box<dyn Link>) -> Vec<(RequestId, UpstreamError)> {
        let failed = self.fail_pending();
        if !self.link.is_destroyed() {
            self.link.destroy();
        }
        self.link = link;
        failed
    }

    pub fn close(&mut self) -> Vec<(RequestId, UpstreamError)> {
        let failed = self.fail_pending();
        if !self.link.is_destroyed() {
            self.link.destroy();
        }
        failed
    }

    fn fail_pending(&mut self) -> Vec<(RequestId, UpstreamError)> {
        let mut failed: Vec<(RequestId, UpstreamError)> = self
            .pending
            .drain()
            .map(|(request_id, _)| (request_id, UpstreamError::Link(LinkError::Destroyed)))
            .collect();
        failed.sort_by_key(|(request_id, _)| *request_id);
        failed
    }
}
