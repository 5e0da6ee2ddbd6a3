use std::{collections::BTreeMap, collections::HashMap, rc::Rc};

use serde_json::Value;

use crate::{
    HandshakeConfig, MethodBody, MethodDispatchTable, MethodError, MethodKind, PropertyDefault,
    RecreateError, SessionKey, StateProperty, SyncableCore,
};

/// Rebuilds the state of an evicted Syncable when a replica reconnects to it.
/// `Ok(None)` means there is nothing to recreate.
pub type RecreateHook =
    Rc<dyn Fn(&SessionKey, &HandshakeConfig) -> Result<Option<BTreeMap<String, Value>>, RecreateError>>;

/// Definition of one replication type: its declared properties, its methods
/// and how to recreate an instance after eviction.
pub struct SyncableType {
    name: String,
    properties: HashMap<String, StateProperty>,
    methods: MethodDispatchTable,
    recreate: Option<RecreateHook>,
}

impl SyncableType {
    pub fn builder(name: &str) -> SyncableTypeBuilder {
        SyncableTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self, key: &str) -> Option<&StateProperty> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> impl Iterator<Item = &StateProperty> {
        self.properties.values()
    }

    pub fn methods(&self) -> &MethodDispatchTable {
        &self.methods
    }

    pub fn recreate_hook(&self) -> Option<&RecreateHook> {
        self.recreate.as_ref()
    }
}

pub struct SyncableTypeBuilder {
    name: String,
    properties: HashMap<String, StateProperty>,
    methods: MethodDispatchTable,
    recreate: Option<RecreateHook>,
}

impl SyncableTypeBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: HashMap::new(),
            methods: MethodDispatchTable::new(),
            recreate: None,
        }
    }

    /// Declares a property only the Server may write.
    pub fn property(mut self, name: &str, default: Value) -> Self {
        let property = StateProperty::new(name, Some(PropertyDefault::Static(default)));
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Declares a property whose default is produced on first read.
    pub fn property_with<F: Fn() -> Value + 'static>(mut self, name: &str, factory: F) -> Self {
        let property = StateProperty::new(name, Some(PropertyDefault::Factory(Rc::new(factory))));
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Declares a property both sides may write.
    pub fn client_writable_property(mut self, name: &str, default: Value) -> Self {
        let property =
            StateProperty::new(name, Some(PropertyDefault::Static(default))).client_writable();
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn sync_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut SyncableCore, &[Value]) -> Result<Value, MethodError> + 'static,
    {
        self.method(name, MethodKind::Sync, Rc::new(body))
    }

    pub fn client_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut SyncableCore, &[Value]) -> Result<Value, MethodError> + 'static,
    {
        self.method(name, MethodKind::Client, Rc::new(body))
    }

    pub fn upstream_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut SyncableCore, &[Value]) -> Result<Value, MethodError> + 'static,
    {
        self.method(name, MethodKind::Upstream, Rc::new(body))
    }

    pub fn method(mut self, name: &str, kind: MethodKind, body: MethodBody) -> Self {
        self.methods.insert(name, kind, body);
        self
    }

    pub fn recreate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SessionKey, &HandshakeConfig) -> Result<Option<BTreeMap<String, Value>>, RecreateError>
            + 'static,
    {
        self.recreate = Some(Rc::new(hook));
        self
    }

    pub fn build(self) -> SyncableType {
        SyncableType {
            name: self.name,
            properties: self.properties,
            methods: self.methods,
            recreate: self.recreate,
        }
    }
}
