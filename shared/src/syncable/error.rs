use thiserror::Error;

use crate::{HostType, MethodError, SyncableId, Version};

/// Errors raised by the declared-property setter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// This side is not permitted to write the property
    #[error("Property `{key}` is not writable on the {host_type:?} side")]
    NotWritable {
        key: String,
        host_type: HostType,
    },
}

/// Errors raised while a replica applies replicated log entries.
///
/// Any of these means the replica can no longer trust its copy; they are
/// surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessUpdateError {
    /// The entry kind is not one this build understands
    #[error("Unknown update kind `{kind}` at version {version}")]
    UnknownUpdate {
        kind: String,
        version: Version,
    },

    /// The entry's arguments do not have the shape its kind requires
    #[error("Malformed `{kind}` update at version {version}: {reason}")]
    MalformedArgs {
        kind: String,
        version: Version,
        reason: &'static str,
    },

    /// A batch skipped over versions the replica never received
    #[error("Update batch jumps from local version {local} to {received}")]
    VersionGap {
        local: Version,
        received: Version,
    },

    /// Replicated entries are only applied on replicas
    #[error("Replicated updates cannot be applied on the authoritative side")]
    AuthoritativeSide,

    /// Replaying a `call` entry failed
    #[error("Replayed method failed: {0}")]
    Method(#[from] MethodError),
}

/// Errors raised when constructing a Syncable from a snapshot or type name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncableError {
    /// No type with this name is registered with the Protocol
    #[error("Syncable type `{type_name}` is not registered with the Protocol")]
    UnknownType {
        type_name: String,
    },

    /// A snapshot was restored against the wrong type definition
    #[error("Snapshot of type `{found}` cannot be restored as `{expected}`")]
    TypeMismatch {
        expected: String,
        found: String,
    },

    /// Snapshots have no log to serve catch-up from
    #[error("Snapshot of {id} cannot be restored on the authoritative side")]
    AuthoritativeSnapshot {
        id: SyncableId,
    },
}

/// Error reported by a type's recreation hook
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Recreation failed: {0}")]
pub struct RecreateError(pub String);
