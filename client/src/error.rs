use thiserror::Error;

use syncable_shared::{
    LinkError, MethodError, ProcessUpdateError, PropertyError, SyncableError, SyncableId,
};

use crate::UpstreamError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Syncable(#[from] SyncableError),

    #[error("No replica of Syncable `{id}` is held by this Client")]
    UnknownSyncable { id: SyncableId },

    #[error("Failed to apply updates: {0}")]
    ProcessUpdate(#[from] ProcessUpdateError),

    #[error(transparent)]
    Method(#[from] MethodError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Failed to open link: {0}")]
    Link(#[from] LinkError),

    #[error("Malformed `{event}` payload: {reason}")]
    MalformedPayload { event: String, reason: String },
}
