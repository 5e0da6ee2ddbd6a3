//! # Syncable Shared
//! Common functionality shared between syncable-server & syncable-client
//! crates: the replicated object itself, its log, queues and method table,
//! the wire messages and the `Link` a replica is mirrored over.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod config;
mod identity;
mod link;
mod messages;
mod method;
mod protocol;
mod queue;
mod syncable;
mod timer;
mod types;
mod update_log;

pub use config::SyncConfig;
pub use identity::SyncableId;
pub use link::{
    error::LinkError,
    link::{demand_message, respond_message, submit_message, Link},
};
pub use messages::{
    ErrorMessage, HandshakeConfig, UpdateBatch, UpstreamRequest, UpstreamResponse, ERROR_EVENT,
    PROCESS_UPDATES_EVENT, SYNCABLE_NOT_FOUND, UPSTREAM_METHOD_EVENT,
};
pub use method::{
    error::MethodError,
    method_kind::{Dispatch, MethodKind},
    method_table::{MethodBody, MethodDispatchTable, MethodEntry},
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use queue::{
    queue::{Queue, QueueListener, QueueMessage},
    queue_dispatcher::QueueDispatcher,
};
pub use syncable::{
    dry::{DryQueue, DrySyncable},
    error::{ProcessUpdateError, PropertyError, RecreateError, SyncableError},
    events::{PropertyChange, PropertyChangeEvent, SyncableEvent, SyncableEvents},
    state_property::{PropertyDefault, StateProperty},
    syncable_core::SyncableCore,
    syncable_type::{RecreateHook, SyncableType, SyncableTypeBuilder},
};
pub use timer::DebounceTimer;
pub use types::{HostType, QueueCounter, RequestId, SessionKey, Version};
pub use update_log::{
    log_entry::{LogEntry, UpdateKind},
    log_store::LogStore,
};
