use std::collections::{HashMap, HashSet};

use thiserror::Error;

use syncable_shared::{SessionKey, SyncableId};

use crate::ServerSyncable;

/// Why a `(type, id)` lookup within a transport session failed. Remotes only
/// ever see the same `SYNCABLE_NOT_FOUND` code for all three.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupMiss {
    #[error("No Syncables are registered for session `{session}`")]
    NoSession {
        session: SessionKey,
    },

    #[error("No Syncables of type `{type_name}` are registered for session `{session}`")]
    NoTypeBucket {
        session: SessionKey,
        type_name: String,
    },

    #[error("Syncable `{type_name}` with id {id} is not registered for session `{session}`")]
    NoInstance {
        session: SessionKey,
        type_name: String,
        id: SyncableId,
    },
}

/// Owns every authoritative Syncable of the process, and records which
/// transport sessions may reach which of them by `(type, id)`.
#[derive(Default)]
pub struct SyncableRegistry {
    syncables: HashMap<SyncableId, ServerSyncable>,
    scopes: HashMap<SessionKey, HashMap<String, HashSet<SyncableId>>>,
}

impl SyncableRegistry {
    pub fn new() -> Self {
        Self {
            syncables: HashMap::new(),
            scopes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.syncables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syncables.is_empty()
    }

    pub fn contains(&self, id: &SyncableId) -> bool {
        self.syncables.contains_key(id)
    }

    pub fn get(&self, id: &SyncableId) -> Option<&ServerSyncable> {
        self.syncables.get(id)
    }

    pub fn get_mut(&mut self, id: &SyncableId) -> Option<&mut ServerSyncable> {
        self.syncables.get_mut(id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SyncableId, &mut ServerSyncable)> {
        self.syncables.iter_mut()
    }

    /// Takes ownership of `syncable` and scopes it to `session`.
    pub(crate) fn insert(&mut self, session: &SessionKey, syncable: ServerSyncable) -> SyncableId {
        let id = syncable.core().id().clone();
        let type_name = syncable.core().type_name().to_string();
        self.syncables.insert(id.clone(), syncable);
        self.scope(session, &type_name, &id);
        id
    }

    /// Makes an already-owned Syncable reachable from `session`.
    pub(crate) fn scope(&mut self, session: &SessionKey, type_name: &str, id: &SyncableId) {
        self.scopes
            .entry(session.clone())
            .or_default()
            .entry(type_name.to_string())
            .or_default()
            .insert(id.clone());
    }

    pub fn lookup(
        &mut self,
        session: &SessionKey,
        type_name: &str,
        id: &SyncableId,
    ) -> Result<&mut ServerSyncable, LookupMiss> {
        let scope = self.scopes.get(session).ok_or_else(|| LookupMiss::NoSession {
            session: session.clone(),
        })?;
        let bucket = scope.get(type_name).ok_or_else(|| LookupMiss::NoTypeBucket {
            session: session.clone(),
            type_name: type_name.to_string(),
        })?;

        let miss = || LookupMiss::NoInstance {
            session: session.clone(),
            type_name: type_name.to_string(),
            id: id.clone(),
        };
        if !bucket.contains(id) {
            return Err(miss());
        }
        self.syncables.get_mut(id).ok_or_else(miss)
    }

    pub fn is_scoped_anywhere(&self, id: &SyncableId) -> bool {
        self.scopes
            .values()
            .any(|scope| scope.values().any(|bucket| bucket.contains(id)))
    }

    /// Drops the scope of `session`. Syncables no longer reachable from any
    /// session are removed and returned.
    pub(crate) fn remove_session(&mut self, session: &SessionKey) -> Vec<ServerSyncable> {
        let Some(scope) = self.scopes.remove(session) else {
            return Vec::new();
        };

        let mut orphans = Vec::new();
        for id in scope.into_values().flatten() {
            if self.is_scoped_anywhere(&id) {
                continue;
            }
            if let Some(syncable) = self.syncables.remove(&id) {
                orphans.push(syncable);
            }
        }
        orphans
    }
}
