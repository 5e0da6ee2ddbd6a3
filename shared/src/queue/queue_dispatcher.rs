//! # `QueueDispatcher` – named queues with one global delivery order
//!
//! Every Syncable owns one dispatcher. A push to *any* queue draws the next
//! value of a single per-object counter, and every delivery carries the
//! counter of the message it delivers.
//!
//! | Field | Purpose |
//! |-------|---------|
//! | `queues`          | Named queues, each with listeners and a buffer of undelivered messages. |
//! | `counter`         | Last counter value handed out; shared by all queues. |
//! | `pending`         | Deliveries scheduled but not yet invoked. |
//! | `delivery_timer`  | Debounce re-armed by every scheduled delivery. |
//!
//! Deliveries are never invoked synchronously. When the timer rings, the
//! whole pending list is sorted by counter and invoked in that order, so that
//! watching queue `B` before queue `A` within one tick still delivers `A`'s
//! older message first.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use log::debug;
use serde_json::Value;

use crate::{
    queue::queue::{Queue, QueueListener, QueueMessage},
    DebounceTimer, QueueCounter,
};

#[derive(Clone)]
struct PendingDelivery {
    counter: QueueCounter,
    listener: QueueListener,
    args: Vec<Value>,
}

#[derive(Clone)]
pub struct QueueDispatcher {
    buffering: bool,
    counter: QueueCounter,
    queues: BTreeMap<String, Queue>,
    pending: Vec<PendingDelivery>,
    delivery_timer: DebounceTimer,
}

impl QueueDispatcher {
    /// `buffering` decides whether pushes to a queue without listeners are
    /// kept until a listener arrives. Only replicas buffer; the authoritative
    /// side keeps its history in the log instead.
    pub fn new(buffering: bool, delivery_debounce: Duration) -> Self {
        Self {
            buffering,
            counter: 0,
            queues: BTreeMap::new(),
            pending: Vec::new(),
            delivery_timer: DebounceTimer::new(delivery_debounce),
        }
    }

    pub fn counter(&self) -> QueueCounter {
        self.counter
    }

    pub fn queue(&self, name: &str) -> Option<&Queue> {
        self.queues.get(name)
    }

    pub fn queues(&self) -> impl Iterator<Item = &Queue> {
        self.queues.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending_deliveries(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn push(&mut self, name: &str, args: Vec<Value>, now: Instant) -> QueueCounter {
        self.counter += 1;
        let counter = self.counter;

        let queue = self
            .queues
            .entry(name.to_string())
            .or_insert_with(|| Queue::new(name));

        if queue.has_listeners() {
            let listeners: Vec<QueueListener> = queue.listeners().to_vec();
            for listener in listeners {
                self.schedule(counter, listener, args.clone(), now);
            }
        } else if self.buffering {
            queue.buffer(QueueMessage { counter, args });
        }

        counter
    }

    pub fn watch(&mut self, name: &str, listener: QueueListener, now: Instant) {
        let queue = self
            .queues
            .entry(name.to_string())
            .or_insert_with(|| Queue::new(name));

        queue.add_listener(listener.clone());
        let buffered = queue.take_messages();

        if !buffered.is_empty() {
            debug!("Queue `{}` draining {} buffered message(s)", name, buffered.len());
        }
        for message in buffered {
            self.schedule(message.counter, listener.clone(), message.args, now);
        }
    }

    /// Empties the buffer of `name`. Deliveries already scheduled still run.
    pub fn clear(&mut self, name: &str) {
        if let Some(queue) = self.queues.get_mut(name) {
            queue.clear_messages();
        }
    }

    /// Restores buffered messages from a snapshot. The counter moves past
    /// every restored message so later pushes sort after them.
    pub fn restore(&mut self, name: &str, messages: Vec<QueueMessage>) {
        let queue = self
            .queues
            .entry(name.to_string())
            .or_insert_with(|| Queue::new(name));
        for message in messages {
            self.counter = self.counter.max(message.counter);
            queue.buffer(message);
        }
    }

    /// Invokes every pending delivery in counter order if the debounce timer
    /// has rung. Returns how many deliveries ran.
    pub fn deliver(&mut self, now: &Instant) -> usize {
        if !self.delivery_timer.take_ringing(now) {
            return 0;
        }

        let mut pending = std::mem::take(&mut self.pending);
        // stable: listeners of one message keep registration order
        pending.sort_by_key(|delivery| delivery.counter);

        let delivered = pending.len();
        for delivery in pending {
            let mut listener = delivery.listener.borrow_mut();
            (&mut *listener)(&delivery.args);
        }
        delivered
    }

    fn schedule(
        &mut self,
        counter: QueueCounter,
        listener: QueueListener,
        args: Vec<Value>,
        now: Instant,
    ) {
        self.pending.push(PendingDelivery {
            counter,
            listener,
            args,
        });
        self.delivery_timer.arm(now);
    }
}
