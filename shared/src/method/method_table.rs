use std::{collections::HashMap, rc::Rc};

use serde_json::Value;

use crate::{MethodError, MethodKind, SyncableCore};

/// A method body. Bodies mutate the Syncable through its primitives
/// (`set_property`, `push_queue`, `clear_queue`) and never log by themselves.
pub type MethodBody = Rc<dyn Fn(&mut SyncableCore, &[Value]) -> Result<Value, MethodError>>;

#[derive(Clone)]
pub struct MethodEntry {
    kind: MethodKind,
    body: MethodBody,
}

impl MethodEntry {
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }
}

/// Every method of one Syncable type, keyed by name. Built once when the type
/// is defined and shared by all of its instances.
#[derive(Clone, Default)]
pub struct MethodDispatchTable {
    methods: HashMap<String, MethodEntry>,
}

impl MethodDispatchTable {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, kind: MethodKind, body: MethodBody) {
        self.methods
            .insert(name.to_string(), MethodEntry { kind, body });
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<MethodKind> {
        self.methods.get(name).map(|entry| entry.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Looks up a method that a remote caller is allowed to invoke.
    pub fn upstream(&self, name: &str, type_name: &str) -> Result<&MethodEntry, MethodError> {
        let entry = self.methods.get(name).ok_or_else(|| MethodError::UnknownMethod {
            type_name: type_name.to_string(),
            method: name.to_string(),
        })?;
        if entry.kind != MethodKind::Upstream {
            return Err(MethodError::NotUpstream {
                method: name.to_string(),
                kind: entry.kind,
            });
        }
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
