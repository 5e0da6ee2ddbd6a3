use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::QueueCounter;

/// A callback attached to a named queue. Shared so that one listener can sit
/// in several pending deliveries at once.
pub type QueueListener = Rc<RefCell<dyn FnMut(&[Value])>>;

/// A message pushed before any listener was attached to its queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub counter: QueueCounter,
    pub args: Vec<Value>,
}

#[derive(Clone)]
pub struct Queue {
    name: String,
    listeners: Vec<QueueListener>,
    messages: Vec<QueueMessage>,
}

impl Queue {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            listeners: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners(&self) -> &[QueueListener] {
        &self.listeners
    }

    pub fn messages(&self) -> &[QueueMessage] {
        &self.messages
    }

    pub(crate) fn add_listener(&mut self, listener: QueueListener) {
        self.listeners.push(listener);
    }

    pub(crate) fn buffer(&mut self, message: QueueMessage) {
        self.messages.push(message);
    }

    pub(crate) fn take_messages(&mut self) -> Vec<QueueMessage> {
        std::mem::take(&mut self.messages)
    }

    pub(crate) fn clear_messages(&mut self) {
        self.messages.clear();
    }
}
