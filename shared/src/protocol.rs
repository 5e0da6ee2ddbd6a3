use std::{collections::HashMap, rc::Rc};

use crate::{SyncableError, SyncableType};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
/// Every Syncable type a process knows about. Server and Client must be
/// built from identical protocols: method bodies, property defaults and
/// permissions are looked up here by type name on both sides.
#[derive(Clone, Default)]
pub struct Protocol {
    types: HashMap<String, Rc<SyncableType>>,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    /// Registers a type. A later registration under the same name replaces
    /// the earlier one.
    pub fn add_type(&mut self, syncable_type: SyncableType) -> &mut Self {
        self.check_lock();
        self.types
            .insert(syncable_type.name().to_string(), Rc::new(syncable_type));
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_type(&mut self, syncable_type: SyncableType) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        if self.types.contains_key(syncable_type.name()) {
            return Err(ProtocolError::DuplicateType {
                type_name: syncable_type.name().to_string(),
            });
        }
        self.types
            .insert(syncable_type.name().to_string(), Rc::new(syncable_type));
        Ok(self)
    }

    // Lookup

    pub fn get(&self, type_name: &str) -> Option<&Rc<SyncableType>> {
        self.types.get(type_name)
    }

    pub fn type_or_err(&self, type_name: &str) -> Result<Rc<SyncableType>, SyncableError> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| SyncableError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    // Lock

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
