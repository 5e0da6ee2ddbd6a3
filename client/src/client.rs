use std::{collections::HashMap, mem, time::Instant};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use syncable_shared::{
    Dispatch, DrySyncable, ErrorMessage, HandshakeConfig, HostType, Protocol, RequestId,
    SyncableCore, SyncableId, UpdateBatch, ERROR_EVENT, PROCESS_UPDATES_EVENT,
};

use crate::{
    ClientConfig, ClientError, ClientEvents, ClientSyncable, LinkConnector, UpstreamGateway,
};

/// Result of [`Client::call`]
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    /// The method ran locally
    Returned(Value),
    /// The method was forwarded upstream; its result shows up as a
    /// [`ResponseEvent`](crate::ResponseEvent) carrying this id
    Pending(RequestId),
}

/// Holds the replicas mirrored from a Server, at most one per Syncable id.
/// Driven by the caller: the transport hands over inbound events and
/// responses, and `update` must be called regularly to flush queue
/// deliveries and expire upstream calls. Upstream deadlines and the timers
/// of new replicas count from the `now` of the latest `update`.
pub struct Client {
    config: ClientConfig,
    protocol: Protocol,
    connector: Box<dyn LinkConnector>,
    syncables: HashMap<SyncableId, ClientSyncable>,
    incoming_events: ClientEvents,
    clock: Instant,
}

impl Client {
    /// Create a new Client
    pub fn new<P: Into<Protocol>>(
        config: ClientConfig,
        protocol: P,
        connector: Box<dyn LinkConnector>,
    ) -> Self {
        Self {
            config,
            protocol: protocol.into(),
            connector,
            syncables: HashMap::new(),
            incoming_events: ClientEvents::new(),
            clock: Instant::now(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    // Replicas

    /// Rehydrates a snapshot into a live replica and opens its link. If a
    /// replica with the same id is already held, it is reused and the
    /// snapshot is ignored.
    pub fn undry(&mut self, dry: DrySyncable) -> Result<SyncableId, ClientError> {
        if self.syncables.contains_key(&dry.id) {
            debug!("Reusing replica of {}({})", dry.type_name, dry.id);
            return Ok(dry.id);
        }

        let kind = self.protocol.type_or_err(&dry.type_name)?;
        let mut core = SyncableCore::from_dry(kind, dry, HostType::Client, &self.config.sync)?;
        core.set_clock(&self.clock);

        let handshake = HandshakeConfig::new(core.type_name(), core.id(), core.version());
        let link = self.connector.connect(&handshake)?;

        info!(
            "Mirroring {}({}) from version {}",
            handshake.type_name, handshake.id, handshake.version
        );

        let id = core.id().clone();
        let gateway = UpstreamGateway::new(link, self.config.upstream_timeout);
        self.syncables
            .insert(id.clone(), ClientSyncable::new(core, gateway));
        Ok(id)
    }

    /// [`Client::undry`] for a snapshot still in its serialized form.
    pub fn undry_value(&mut self, dry: Value) -> Result<SyncableId, ClientError> {
        let dry: DrySyncable =
            serde_json::from_value(dry).map_err(|err| ClientError::MalformedPayload {
                event: "dry".to_string(),
                reason: err.to_string(),
            })?;
        self.undry(dry)
    }

    pub fn contains(&self, id: &SyncableId) -> bool {
        self.syncables.contains_key(id)
    }

    pub fn syncable(&self, id: &SyncableId) -> Option<&SyncableCore> {
        self.syncables.get(id).map(ClientSyncable::core)
    }

    pub fn syncable_mut(&mut self, id: &SyncableId) -> Option<&mut SyncableCore> {
        self.syncables.get_mut(id).map(ClientSyncable::core_mut)
    }

    pub fn syncable_count(&self) -> usize {
        self.syncables.len()
    }

    fn replica_mut(&mut self, id: &SyncableId) -> Result<&mut ClientSyncable, ClientError> {
        self.syncables
            .get_mut(id)
            .ok_or_else(|| ClientError::UnknownSyncable { id: id.clone() })
    }

    /// Drops a replica and destroys its link. Upstream calls still in
    /// flight fail with a link error.
    pub fn release(&mut self, id: &SyncableId) -> bool {
        let Some(mut syncable) = self.syncables.remove(id) else {
            return false;
        };
        info!("Releasing replica {}", id);
        for (request_id, err) in syncable.gateway_mut().close() {
            self.incoming_events.push_response(id, request_id, Err(err));
        }
        true
    }

    /// Opens a fresh link for a replica, announcing its current version so
    /// that the Server only sends what it missed.
    pub fn reconnect(&mut self, id: &SyncableId) -> Result<(), ClientError> {
        let syncable = self
            .syncables
            .get_mut(id)
            .ok_or_else(|| ClientError::UnknownSyncable { id: id.clone() })?;

        let handshake = HandshakeConfig::new(
            syncable.core().type_name(),
            syncable.core().id(),
            syncable.core().version(),
        );
        let link = self.connector.connect(&handshake)?;

        info!("Reconnecting {} at version {}", id, handshake.version);
        for (request_id, err) in syncable.gateway_mut().replace_link(link) {
            self.incoming_events.push_response(id, request_id, Err(err));
        }
        Ok(())
    }

    // Methods

    /// Calls `method` on a replica. `sync` and `client` methods run locally;
    /// `upstream` methods are forwarded to the Server.
    pub fn call(&mut self, id: &SyncableId, method: &str, args: Vec<Value>) -> Result<ClientCall, ClientError> {
        let clock = self.clock;
        let (core, gateway) = self.replica_mut(id)?.parts_mut();

        match core.call(method, args)? {
            Dispatch::Returned(result) => Ok(ClientCall::Returned(result)),
            Dispatch::Forward { method, args } => {
                let request_id = gateway.call(method, args, clock)?;
                Ok(ClientCall::Pending(request_id))
            }
            // replicas never log
            Dispatch::Logged => Ok(ClientCall::Returned(Value::Null)),
        }
    }

    /// Registers a listener on one of a replica's queues. Messages buffered
    /// before the first listener are delivered to it.
    pub fn watch<F: FnMut(&[Value]) + 'static>(
        &mut self,
        id: &SyncableId,
        queue: &str,
        callback: F,
    ) -> Result<(), ClientError> {
        self.replica_mut(id)?.core_mut().watch(queue, callback);
        Ok(())
    }

    // Inbound

    /// The transport delivers an event submitted by the Server on a
    /// replica's link. A `SYNCABLE_NOT_FOUND` error releases the replica, so
    /// that a later `undry` of the same id starts over.
    pub fn receive_event(&mut self, id: &SyncableId, event: &str, payload: Value) -> Result<(), ClientError> {
        match event {
            PROCESS_UPDATES_EVENT => {
                let batch: UpdateBatch = decode(event, payload)?;
                let core = self.replica_mut(id)?.core_mut();
                let applied = core.apply_batch(&batch)?;
                debug!(
                    "Applied {} update(s) to {}, now at version {}",
                    applied,
                    id,
                    core.version()
                );
                Ok(())
            }
            ERROR_EVENT => {
                let message: ErrorMessage = decode(event, payload)?;
                warn!("Server reported `{}` for {}: {}", message.code, id, message.message);
                if message.is_not_found() {
                    self.release(id);
                }
                self.incoming_events.push_error(id, message);
                Ok(())
            }
            _ => {
                debug!("Ignoring unknown event `{}` for {}", event, id);
                Ok(())
            }
        }
    }

    /// The transport delivers the response to an upstream call. Responses
    /// arriving after their call timed out are discarded.
    pub fn receive_response(&mut self, id: &SyncableId, request_id: RequestId, payload: Value) -> Result<(), ClientError> {
        let result = self
            .replica_mut(id)?
            .gateway_mut()
            .receive_response(request_id, payload);
        if let Some(result) = result {
            self.incoming_events.push_response(id, request_id, result);
        }
        Ok(())
    }

    // Updates

    /// Must be called regularly. Runs due queue deliveries, fails upstream
    /// calls that outlived their timeout, and returns everything that
    /// happened since the previous call.
    pub fn update(&mut self, now: &Instant) -> ClientEvents {
        self.clock = *now;
        for (id, syncable) in self.syncables.iter_mut() {
            let (core, gateway) = syncable.parts_mut();
            core.deliver_queue_messages(now);

            for (request_id, err) in gateway.collect_timeouts(now) {
                self.incoming_events.push_response(id, request_id, Err(err));
            }
        }

        mem::take(&mut self.incoming_events)
    }
}

fn decode<T: DeserializeOwned>(event: &str, payload: Value) -> Result<T, ClientError> {
    serde_json::from_value(payload).map_err(|err| ClientError::MalformedPayload {
        event: event.to_string(),
        reason: err.to_string(),
    })
}
