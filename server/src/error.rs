use thiserror::Error;

use syncable_shared::{LinkError, SyncableError, SyncableId};

use crate::LinkKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Type lookup failed while creating a Syncable
    #[error(transparent)]
    Syncable(#[from] SyncableError),

    /// No Syncable with this id is hosted by the Server
    #[error("Syncable {id} is not hosted by this Server")]
    UnknownSyncable {
        id: SyncableId,
    },

    /// A Syncable with this id is already hosted
    #[error("Syncable {id} is already hosted by this Server")]
    DuplicateSyncable {
        id: SyncableId,
    },

    /// Only authoritative Syncables can be hosted
    #[error("Syncable {id} is a replica and cannot be hosted by the Server")]
    NotAuthoritative {
        id: SyncableId,
    },

    /// The transport referred to a link the Server never attached, or
    /// already dropped
    #[error("Link {link_key:?} is not attached to any Syncable")]
    UnknownLink {
        link_key: LinkKey,
    },

    /// Sending on a link failed
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}
