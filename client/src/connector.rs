use syncable_shared::{HandshakeConfig, Link, LinkError};

/// Opens the Link a replica is mirrored over. The transport is expected to
/// deliver `handshake` to the Server's `handle_link` out of band.
pub trait LinkConnector {
    fn connect(&mut self, handshake: &HandshakeConfig) -> Result<Box<dyn Link>, LinkError>;
}
