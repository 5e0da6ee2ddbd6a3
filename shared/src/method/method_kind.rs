use std::fmt;

use serde_json::Value;

/// How a method replicates. Fixed when the method is registered on its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Server runs the body and logs a `call`; replicas run it only when the
    /// logged `call` reaches them.
    Sync,
    /// Server only logs a `call`; replicas run the body.
    Client,
    /// Server runs the body and answers; replicas forward the call upstream.
    Upstream,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Sync => "sync",
            MethodKind::Client => "client",
            MethodKind::Upstream => "upstream",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened when a method was called through dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// The body ran here and produced a value.
    Returned(Value),
    /// The body did not run here; a `call` entry was logged for replicas.
    Logged,
    /// The body must run upstream; the caller forwards it over the link.
    Forward { method: String, args: Vec<Value> },
}

impl Dispatch {
    pub fn returned(&self) -> Option<&Value> {
        match self {
            Dispatch::Returned(value) => Some(value),
            _ => None,
        }
    }
}
