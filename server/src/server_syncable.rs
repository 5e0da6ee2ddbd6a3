use std::collections::HashMap;

use log::{info, warn};

use syncable_shared::{respond_message, LinkError, RequestId, SessionKey, SyncableCore, UpstreamResponse};

use crate::{LinkKey, LinkSession};

/// An authoritative Syncable together with the LinkSessions mirroring it.
pub struct ServerSyncable {
    core: SyncableCore,
    sessions: HashMap<LinkKey, LinkSession>,
}

impl ServerSyncable {
    pub fn new(core: SyncableCore) -> Self {
        Self {
            core,
            sessions: HashMap::new(),
        }
    }

    pub fn core(&self) -> &SyncableCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut SyncableCore {
        &mut self.core
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, link_key: &LinkKey) -> Option<&LinkSession> {
        self.sessions.get(link_key)
    }

    pub(crate) fn attach(&mut self, link_key: LinkKey, session: LinkSession) {
        self.sessions.insert(link_key, session);
    }

    pub(crate) fn detach(&mut self, link_key: &LinkKey) -> Option<LinkSession> {
        self.sessions.remove(link_key)
    }

    /// Closes and removes every LinkSession attached through `session`.
    pub(crate) fn detach_transport_session(&mut self, session: &SessionKey) -> Vec<LinkKey> {
        let keys: Vec<LinkKey> = self
            .sessions
            .iter()
            .filter(|(_, link_session)| link_session.transport_session() == session)
            .map(|(key, _)| *key)
            .collect();

        for key in &keys {
            if let Some(mut link_session) = self.sessions.remove(key) {
                link_session.close();
            }
        }

        keys
    }

    pub(crate) fn close_all(&mut self) -> Vec<LinkKey> {
        let keys: Vec<LinkKey> = self.sessions.keys().copied().collect();
        for (_, mut link_session) in self.sessions.drain() {
            link_session.close();
        }
        keys
    }

    /// Catch-up for a single LinkSession.
    pub(crate) fn catch_up(&mut self, link_key: &LinkKey) -> Result<usize, LinkError> {
        let Some(link_session) = self.sessions.get_mut(link_key) else {
            return Ok(0);
        };
        link_session.push_updates(&self.core)
    }

    /// Pushes pending entries to every LinkSession. Sessions whose link turns
    /// out to be destroyed are dropped and their keys returned.
    pub(crate) fn broadcast(&mut self) -> (usize, Vec<LinkKey>) {
        let mut batches = 0;
        let mut dead_links = Vec::new();

        for (link_key, link_session) in self.sessions.iter_mut() {
            match link_session.push_updates(&self.core) {
                Ok(0) => {}
                Ok(_) => batches += 1,
                Err(LinkError::Destroyed) => dead_links.push(*link_key),
                Err(err) => {
                    // cursor stays put; the next broadcast retries
                    warn!(
                        "Failed to push updates of {}({}) to link {:?}: {}",
                        self.core.type_name(),
                        self.core.id(),
                        link_key,
                        err
                    );
                }
            }
        }

        for link_key in &dead_links {
            info!("Dropping destroyed link {:?} from {}", link_key, self.core.id());
            self.sessions.remove(link_key);
        }

        (batches, dead_links)
    }

    pub(crate) fn respond(
        &mut self,
        link_key: &LinkKey,
        request_id: RequestId,
        response: &UpstreamResponse,
    ) -> Result<(), LinkError> {
        let Some(link_session) = self.sessions.get_mut(link_key) else {
            return Err(LinkError::Destroyed);
        };
        respond_message(link_session.link_mut(), request_id, response)
    }
}
