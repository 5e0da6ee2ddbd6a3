use thiserror::Error;

/// Errors reported by a [`Link`](crate::Link) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The link was destroyed, locally or by the remote end
    #[error("Link has been destroyed")]
    Destroyed,

    /// The transport could not send the payload
    #[error("Link failed to send `{event}`: {reason}")]
    Send {
        event: String,
        reason: String,
    },

    /// The payload could not be encoded
    #[error("Failed to serialize `{event}` payload: {reason}")]
    Serialize {
        event: String,
        reason: String,
    },
}
