//! # Syncable Client
//! Mirrors Syncables hosted on a Server. A replica is rehydrated from the
//! snapshot it was shipped in, opens a link announcing the version it
//! holds, then applies the updates the Server pushes. Upstream methods are
//! forwarded to the Server and resolve asynchronously through
//! [`Client::update`].

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use syncable_shared::{
        DrySyncable, HandshakeConfig, Link, LinkError, MethodKind, Protocol, RequestId,
        SyncConfig, SyncableCore, SyncableId, SyncableType, Version,
    };
}

mod client;
mod client_config;
mod client_syncable;
mod connector;
mod error;
mod events;
mod upstream;

pub use client::{Client, ClientCall};
pub use client_config::ClientConfig;
pub use client_syncable::ClientSyncable;
pub use connector::LinkConnector;
pub use error::ClientError;
pub use events::{ClientEvent, ClientEvents, ErrorEvent, ResponseEvent, UpstreamResult};
pub use upstream::{UpstreamError, UpstreamGateway};
