use std::{fmt, rc::Rc};

use serde_json::Value;

use crate::HostType;

/// Value a declared property takes the first time it is read.
#[derive(Clone)]
pub enum PropertyDefault {
    Static(Value),
    Factory(Rc<dyn Fn() -> Value>),
}

impl PropertyDefault {
    pub fn produce(&self) -> Value {
        match self {
            PropertyDefault::Static(value) => value.clone(),
            PropertyDefault::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for PropertyDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyDefault::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PropertyDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StateProperty {
    name: String,
    default: Option<PropertyDefault>,
    client_writable: bool,
}

impl StateProperty {
    pub fn new(name: &str, default: Option<PropertyDefault>) -> Self {
        Self {
            name: name.to_string(),
            default,
            client_writable: false,
        }
    }

    pub fn client_writable(mut self) -> Self {
        self.client_writable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(PropertyDefault::produce)
    }

    /// The Server may always write; a Client only when the property opted in.
    pub fn writable_by(&self, host_type: HostType) -> bool {
        match host_type {
            HostType::Server => true,
            HostType::Client => self.client_writable,
        }
    }
}
