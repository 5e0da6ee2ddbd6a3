use std::{collections::HashMap, time::Instant};

use log::{debug, info, warn};
use serde_json::Value;

use syncable_shared::{
    submit_message, DrySyncable, ErrorMessage, HandshakeConfig, HostType, Link,
    PropertyChangeEvent, Protocol, RequestId, SessionKey, SyncableCore, SyncableId,
    UpstreamRequest, UpstreamResponse, Version, ERROR_EVENT, UPSTREAM_METHOD_EVENT,
};

use crate::{
    registry::SyncableRegistry, LinkKey, LinkSession, ServerConfig, ServerError, ServerEvents,
    ServerSyncable,
};

/// Hosts authoritative Syncables and the links of the replicas mirroring
/// them. Driven by the caller: the transport hands over new links, demands
/// and closures, and `update` must be called regularly to flush queue
/// deliveries and debounced broadcasts.
///
/// The `now` of the latest `update` is the Server's clock: Syncables it
/// creates or adopts arm their timers from it until they are next polled.
pub struct Server {
    config: ServerConfig,
    protocol: Protocol,
    registry: SyncableRegistry,
    link_routes: HashMap<LinkKey, SyncableId>,
    next_link_key: u64,
    clock: Instant,
}

impl Server {
    /// Create a new Server
    pub fn new<P: Into<Protocol>>(config: ServerConfig, protocol: P) -> Self {
        Self {
            config,
            protocol: protocol.into(),
            registry: SyncableRegistry::new(),
            link_routes: HashMap::new(),
            next_link_key: 0,
            clock: Instant::now(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    // Syncables

    /// Creates a new authoritative Syncable of `type_name`, reachable from
    /// `session`.
    pub fn create(&mut self, session: &SessionKey, type_name: &str) -> Result<SyncableId, ServerError> {
        let kind = self.protocol.type_or_err(type_name)?;
        let core = SyncableCore::new(kind, HostType::Server, &self.config.sync);
        self.insert(session, core)
    }

    /// Hosts an existing authoritative Syncable, reachable from `session`.
    pub fn insert(&mut self, session: &SessionKey, mut core: SyncableCore) -> Result<SyncableId, ServerError> {
        if !core.is_authoritative() {
            return Err(ServerError::NotAuthoritative {
                id: core.id().clone(),
            });
        }
        if self.registry.contains(core.id()) {
            return Err(ServerError::DuplicateSyncable {
                id: core.id().clone(),
            });
        }

        core.set_clock(&self.clock);
        info!("Hosting {}({}) for session `{}`", core.type_name(), core.id(), session);
        Ok(self.registry.insert(session, ServerSyncable::new(core)))
    }

    /// Makes a hosted Syncable reachable from another transport session.
    pub fn share(&mut self, session: &SessionKey, id: &SyncableId) -> Result<(), ServerError> {
        let type_name = self
            .registry
            .get(id)
            .map(|syncable| syncable.core().type_name().to_string())
            .ok_or_else(|| ServerError::UnknownSyncable { id: id.clone() })?;
        self.registry.scope(session, &type_name, id);
        Ok(())
    }

    pub fn syncable(&self, id: &SyncableId) -> Option<&SyncableCore> {
        self.registry.get(id).map(ServerSyncable::core)
    }

    pub fn syncable_mut(&mut self, id: &SyncableId) -> Option<&mut SyncableCore> {
        self.registry.get_mut(id).map(ServerSyncable::core_mut)
    }

    pub fn syncable_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot to embed in whatever payload hands the Syncable to a remote.
    pub fn dry(&self, id: &SyncableId) -> Option<DrySyncable> {
        self.syncable(id).map(SyncableCore::to_dry)
    }

    pub fn link_count(&self, id: &SyncableId) -> usize {
        self.registry
            .get(id)
            .map(ServerSyncable::session_count)
            .unwrap_or(0)
    }

    pub fn acknowledged_version(&self, link_key: &LinkKey) -> Option<Version> {
        let id = self.link_routes.get(link_key)?;
        self.registry
            .get(id)?
            .session(link_key)
            .map(LinkSession::acknowledged_version)
    }

    // Links

    /// Attaches a replica's link to the Syncable named by `config`, as seen
    /// from `session`, and immediately catches it up.
    ///
    /// If the Syncable cannot be found (and cannot be recreated), an `error`
    /// event with code `SYNCABLE_NOT_FOUND` is submitted on the link, the
    /// link is destroyed and `None` is returned. The same happens when the
    /// handshake names a version this instance's log cannot continue from:
    /// one ahead of it, or any non-zero version of a freshly recreated
    /// instance. A recreated instance stays hosted, so a new snapshot of it
    /// can be mirrored.
    pub fn handle_link(
        &mut self,
        session: &SessionKey,
        mut link: Box<dyn Link>,
        config: HandshakeConfig,
    ) -> Option<LinkKey> {
        let lookup = self
            .registry
            .lookup(session, &config.type_name, &config.id)
            .map(|syncable| syncable.core().id().clone());
        let (id, recreated) = match lookup {
            Ok(id) => (id, false),
            Err(miss) => {
                let recreated = if self.config.recreate_missing {
                    self.try_recreate(session, &config)
                } else {
                    None
                };
                match recreated {
                    Some(id) => (id, true),
                    None => {
                        Self::refuse_link(link.as_mut(), miss.to_string());
                        return None;
                    }
                }
            }
        };

        let version = self.registry.get(&id)?.core().version();
        if config.version > version || (recreated && config.version > 0) {
            let reason = format!(
                "{}({}) cannot continue from version {}, it is at version {}",
                config.type_name, id, config.version, version
            );
            Self::refuse_link(link.as_mut(), reason);
            return None;
        }

        let link_key = LinkKey::from_u64(self.next_link_key);
        self.next_link_key += 1;

        let syncable = self.registry.get_mut(&id)?;
        syncable.attach(
            link_key,
            LinkSession::new(link, config.version, session.clone()),
        );
        self.link_routes.insert(link_key, id.clone());

        info!(
            "Link {:?} attached to {}({}) at version {}",
            link_key, config.type_name, id, config.version
        );

        if let Err(err) = syncable.catch_up(&link_key) {
            warn!("Initial catch-up on link {:?} failed: {}", link_key, err);
        }

        Some(link_key)
    }

    fn refuse_link(link: &mut dyn Link, reason: String) {
        info!("Refusing link: {}", reason);
        if let Err(err) = submit_message(link, ERROR_EVENT, &ErrorMessage::not_found(reason)) {
            warn!("Failed to report missing Syncable: {}", err);
        }
        link.destroy();
    }

    /// Rebuilds an evicted Syncable through its type's recreation hook and
    /// scopes it to `session`. The hook's state is written through logged
    /// `set`s, so replicas starting from version 0 receive it. Any failure
    /// is an ordinary miss.
    pub fn try_recreate(&mut self, session: &SessionKey, config: &HandshakeConfig) -> Option<SyncableId> {
        let Some(kind) = self.protocol.get(&config.type_name).cloned() else {
            debug!("Cannot recreate unknown type `{}`", config.type_name);
            return None;
        };
        let hook = kind.recreate_hook()?.clone();

        if self.registry.contains(&config.id) {
            // hosted, just not reachable from this session
            debug!("Not recreating {} outside of its sessions", config.id);
            return None;
        }

        match hook(session, config) {
            Ok(Some(state)) => {
                let mut core =
                    SyncableCore::with_id(kind, config.id.clone(), HostType::Server, &self.config.sync);
                core.set_clock(&self.clock);
                for (key, value) in state {
                    core.set_property(&key, value);
                }
                info!("Recreated {}({}) for session `{}`", config.type_name, config.id, session);
                Some(self.registry.insert(session, ServerSyncable::new(core)))
            }
            Ok(None) => {
                info!("Recreation of {}({}) yielded nothing", config.type_name, config.id);
                None
            }
            Err(err) => {
                warn!("Recreation of {}({}) failed: {}", config.type_name, config.id, err);
                None
            }
        }
    }

    /// Handles a `demand` received on an attached link and responds on it.
    /// Only `upstream` methods can be invoked; anything else is answered
    /// with an error and the link stays open.
    pub fn receive_demand(
        &mut self,
        link_key: &LinkKey,
        request_id: RequestId,
        event: &str,
        payload: Value,
    ) -> Result<(), ServerError> {
        let id = self
            .link_routes
            .get(link_key)
            .cloned()
            .ok_or(ServerError::UnknownLink { link_key: *link_key })?;
        let syncable = self
            .registry
            .get_mut(&id)
            .ok_or(ServerError::UnknownLink { link_key: *link_key })?;

        let response = if event == UPSTREAM_METHOD_EVENT {
            match serde_json::from_value::<UpstreamRequest>(payload) {
                Ok(UpstreamRequest(method, args)) => {
                    match syncable.core_mut().invoke_upstream(&method, &args) {
                        Ok(result) => UpstreamResponse::ok(result),
                        Err(err) => {
                            warn!("Upstream call `{}` on {} rejected: {}", method, id, err);
                            UpstreamResponse::err(err.to_string())
                        }
                    }
                }
                Err(err) => UpstreamResponse::err(format!("Malformed upstream request: {}", err)),
            }
        } else {
            UpstreamResponse::err(format!("Unsupported demand `{}`", event))
        };

        syncable.respond(link_key, request_id, &response)?;
        Ok(())
    }

    /// The transport reports that a link closed.
    pub fn link_closed(&mut self, link_key: &LinkKey) {
        let Some(id) = self.link_routes.remove(link_key) else {
            return;
        };
        if let Some(syncable) = self.registry.get_mut(&id) {
            if syncable.detach(link_key).is_some() {
                info!("Link {:?} detached from {}", link_key, id);
            }
        }
    }

    /// The transport session expired. Its links are closed, and Syncables
    /// reachable from no other session are dropped.
    pub fn remove_session(&mut self, session: &SessionKey) {
        let mut closed = Vec::new();
        for (_, syncable) in self.registry.iter_mut() {
            closed.extend(syncable.detach_transport_session(session));
        }
        for mut orphan in self.registry.remove_session(session) {
            info!("Dropping {}({})", orphan.core().type_name(), orphan.core().id());
            closed.extend(orphan.close_all());
        }
        for link_key in closed {
            self.link_routes.remove(&link_key);
        }
    }

    // Updates

    /// Must be called regularly. Runs due queue deliveries, pushes pending
    /// log entries of every Syncable whose broadcast debounce has elapsed,
    /// and returns the property changes made since the previous call.
    pub fn update(&mut self, now: &Instant) -> ServerEvents {
        self.clock = *now;
        let mut events = ServerEvents::new();
        let mut dead_links = Vec::new();

        for (id, syncable) in self.registry.iter_mut() {
            syncable.core_mut().deliver_queue_messages(now);

            if syncable.core_mut().broadcast_due(now) {
                let (sent, dead) = syncable.broadcast();
                events.add_batches(sent);
                dead_links.extend(dead);
            }

            for change in syncable.core_mut().take_events().read::<PropertyChangeEvent>() {
                events.push_property_change(id, change);
            }
        }

        for link_key in dead_links {
            self.link_routes.remove(&link_key);
        }

        events
    }
}
