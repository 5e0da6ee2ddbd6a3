//! # Syncable Server
//! Hosts authoritative Syncables, scopes them per transport session, and
//! keeps every attached replica caught up by pushing the part of each log it
//! has not acknowledged yet.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use syncable_shared::{
        Dispatch, DrySyncable, HandshakeConfig, Link, LinkError, MethodError, MethodKind,
        Protocol, SessionKey, SyncConfig, SyncableCore, SyncableId, SyncableType,
    };
}

mod error;
mod events;
mod link_session;
mod registry;
mod server;
mod server_syncable;

pub use error::ServerError;
pub use events::{PropertyChangedEvent, ServerEvent, ServerEvents};
pub use link_session::{LinkKey, LinkSession};
pub use registry::{LookupMiss, SyncableRegistry};
pub use server::{Server, ServerConfig};
pub use server_syncable::ServerSyncable;
