use thiserror::Error;

use crate::MethodKind;

/// Errors that can occur while dispatching or running a Syncable method
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MethodError {
    /// Method name not present in the type's dispatch table
    #[error("Method `{method}` is not registered on Syncable type `{type_name}`")]
    UnknownMethod {
        type_name: String,
        method: String,
    },

    /// A remote caller named a method that is not an upstream method
    #[error("Method `{method}` is registered as `{kind}`; only `upstream` methods may be invoked remotely")]
    NotUpstream {
        method: String,
        kind: MethodKind,
    },

    /// Arguments did not match what the method body expects
    #[error("Invalid arguments for method `{method}`: {reason}")]
    InvalidArguments {
        method: String,
        reason: String,
    },

    /// The method body itself reported a failure
    #[error("Method body failed: {0}")]
    Body(String),
}

impl MethodError {
    pub fn body(message: impl Into<String>) -> Self {
        MethodError::Body(message.into())
    }

    pub fn invalid_arguments(method: &str, reason: impl Into<String>) -> Self {
        MethodError::InvalidArguments {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
