use std::time::Duration;

use thiserror::Error;

use syncable_shared::LinkError;

/// Errors an upstream method call can end with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// No response arrived within the timeout window
    #[error("Upstream call `{method}` timed out after {timeout:?}")]
    Timeout {
        method: String,
        timeout: Duration,
    },

    /// The Server answered with an error
    #[error("Upstream call `{method}` failed: {message}")]
    Remote {
        method: String,
        message: String,
    },

    /// The response could not be decoded
    #[error("Malformed response to upstream call `{method}`: {reason}")]
    MalformedResponse {
        method: String,
        reason: String,
    },

    /// The link failed or was torn down before a response arrived
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}
