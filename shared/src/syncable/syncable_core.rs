//! # `SyncableCore` – one replicated object
//!
//! The same struct lives on both sides. Its [`HostType`] decides which half
//! of each primitive runs:
//!
//! | Primitive | Server (authoritative) | Client (replica) |
//! |-----------|------------------------|------------------|
//! | `set_property` | set, log `set`, emit `property_change_<key>` | set |
//! | `call` | per [`MethodKind`], may log `call` | per [`MethodKind`], never logs |
//! | `push_queue` / `clear_queue` | dispatch and log | dispatch (buffering) |
//! | `process_update` | rejected | applies a replicated entry |
//!
//! Every log append bumps `version` by exactly one and re-arms the broadcast
//! debounce; the Server polls [`SyncableCore::broadcast_due`] to know when to
//! push to its LinkSessions.
//!
//! Mutations made inside a `sync` body on the Server are applied but not
//! logged on their own: the single `call` entry re-runs the body on every
//! replica. A body that fails leaves state, queues and events as they were.
//!
//! Time only comes from the caller. Every poll (`deliver_queue_messages`,
//! `broadcast_due`, `set_clock`) records its `now`, and debounce timers
//! armed by later mutations count from that instant.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
    time::Instant,
};

use log::debug;
use serde_json::Value;

use crate::{
    DebounceTimer, Dispatch, DryQueue, DrySyncable, HostType, LogEntry, LogStore, MethodError,
    MethodKind, ProcessUpdateError, PropertyError, QueueCounter, QueueDispatcher, QueueListener,
    SyncConfig, SyncableError, SyncableEvents, SyncableId, SyncableType, UpdateBatch, UpdateKind,
    Version,
};

pub struct SyncableCore {
    kind: Rc<SyncableType>,
    id: SyncableId,
    host_type: HostType,
    version: Version,
    state: BTreeMap<String, Value>,
    log: LogStore,
    queues: QueueDispatcher,
    broadcast_timer: DebounceTimer,
    events: SyncableEvents,
    // > 0 while a logged `sync` body runs; its own `call` entry replays it
    call_depth: u32,
    clock: Instant,
}

// what a failed `sync` body rolls back to
struct Checkpoint {
    state: BTreeMap<String, Value>,
    queues: QueueDispatcher,
    events: SyncableEvents,
}

impl SyncableCore {
    pub fn new(kind: Rc<SyncableType>, host_type: HostType, config: &SyncConfig) -> Self {
        Self::with_id(kind, SyncableId::generate(), host_type, config)
    }

    pub fn with_id(
        kind: Rc<SyncableType>,
        id: SyncableId,
        host_type: HostType,
        config: &SyncConfig,
    ) -> Self {
        Self {
            kind,
            id,
            host_type,
            version: 0,
            state: BTreeMap::new(),
            log: LogStore::new(),
            queues: QueueDispatcher::new(
                !host_type.is_authoritative(),
                config.queue_delivery_debounce,
            ),
            broadcast_timer: DebounceTimer::new(config.broadcast_debounce),
            events: SyncableEvents::new(),
            call_depth: 0,
            clock: Instant::now(),
        }
    }

    /// Rebuilds a replica from its snapshot. Buffered queue messages come
    /// back so that listeners attached later still receive them.
    ///
    /// Snapshots carry no log, so they can never become authoritative.
    pub fn from_dry(
        kind: Rc<SyncableType>,
        dry: DrySyncable,
        host_type: HostType,
        config: &SyncConfig,
    ) -> Result<Self, SyncableError> {
        if kind.name() != dry.type_name {
            return Err(SyncableError::TypeMismatch {
                expected: kind.name().to_string(),
                found: dry.type_name,
            });
        }

        if host_type.is_authoritative() {
            return Err(SyncableError::AuthoritativeSnapshot { id: dry.id });
        }

        let mut core = Self::with_id(kind, dry.id, host_type, config);
        core.version = dry.version;
        core.state = dry.state;
        for (name, queue) in dry.queues {
            core.queues.restore(&name, queue.messages);
        }
        Ok(core)
    }

    // Accessors

    pub fn kind(&self) -> &Rc<SyncableType> {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.name()
    }

    pub fn id(&self) -> &SyncableId {
        &self.id
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn is_authoritative(&self) -> bool {
        self.host_type.is_authoritative()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn state(&self) -> &BTreeMap<String, Value> {
        &self.state
    }

    pub fn log(&self) -> &LogStore {
        &self.log
    }

    pub fn queues(&self) -> &QueueDispatcher {
        &self.queues
    }

    pub fn entries_since(&self, ack_version: Version) -> &[LogEntry] {
        self.log.entries_since(ack_version)
    }

    pub fn take_events(&mut self) -> SyncableEvents {
        std::mem::take(&mut self.events)
    }

    pub fn clock(&self) -> Instant {
        self.clock
    }

    /// Moves the instant that timers armed by the next mutations count
    /// from. Hosts call it when adopting an instance created off their
    /// own clock.
    pub fn set_clock(&mut self, now: &Instant) {
        self.clock = *now;
    }

    // Properties

    /// Reads a property. A declared property missing from `state` gets its
    /// default written into `state` first; that is not a mutation and is
    /// never logged.
    pub fn property(&mut self, key: &str) -> Option<&Value> {
        if !self.state.contains_key(key) {
            let default = self
                .kind
                .property(key)
                .and_then(|property| property.default_value());
            if let Some(value) = default {
                self.state.insert(key.to_string(), value);
            }
        }
        self.state.get(key)
    }

    /// Declared-property setter. Undeclared keys are writable by the Server
    /// only.
    pub fn set(&mut self, key: &str, value: Value) -> Result<bool, PropertyError> {
        let writable = match self.kind.property(key) {
            Some(property) => property.writable_by(self.host_type),
            None => self.is_authoritative(),
        };
        if !writable {
            return Err(PropertyError::NotWritable {
                key: key.to_string(),
                host_type: self.host_type,
            });
        }
        Ok(self.set_property(key, value))
    }

    /// Returns false without doing anything when the value is unchanged.
    pub fn set_property(&mut self, key: &str, value: Value) -> bool {
        if self.state.get(key) == Some(&value) {
            return false;
        }

        self.state.insert(key.to_string(), value.clone());

        if self.is_authoritative() {
            self.append(UpdateKind::Set, vec![Value::String(key.to_string()), value.clone()]);
            self.events.push_property_change(key, value);
        }

        true
    }

    // Methods

    /// Calls `method` through dispatch; the raw body is never reachable
    /// from here without its kind's rule applying.
    pub fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Dispatch, MethodError> {
        let kind = self.kind.clone();
        let entry = kind
            .methods()
            .get(method)
            .ok_or_else(|| MethodError::UnknownMethod {
                type_name: kind.name().to_string(),
                method: method.to_string(),
            })?;
        let body = entry.body().clone();

        match (entry.kind(), self.host_type) {
            (MethodKind::Sync, HostType::Server) => {
                let checkpoint = self.checkpoint();
                self.call_depth += 1;
                let result = body(self, &args);
                self.call_depth -= 1;
                match result {
                    Ok(result) => {
                        self.log_call(method, args);
                        Ok(Dispatch::Returned(result))
                    }
                    Err(err) => {
                        debug!("Sync method `{}` on {} failed, rolling back", method, self.id);
                        self.restore(checkpoint);
                        Err(err)
                    }
                }
            }
            (MethodKind::Sync, HostType::Client) => Ok(Dispatch::Returned(body(self, &args)?)),
            (MethodKind::Client, HostType::Server) => {
                self.log_call(method, args);
                Ok(Dispatch::Logged)
            }
            (MethodKind::Client, HostType::Client) => Ok(Dispatch::Returned(body(self, &args)?)),
            (MethodKind::Upstream, HostType::Server) => Ok(Dispatch::Returned(body(self, &args)?)),
            (MethodKind::Upstream, HostType::Client) => Ok(Dispatch::Forward {
                method: method.to_string(),
                args,
            }),
        }
    }

    /// Runs a method on behalf of a remote caller. Only `upstream` methods
    /// may be invoked this way.
    pub fn invoke_upstream(&mut self, method: &str, args: &[Value]) -> Result<Value, MethodError> {
        let kind = self.kind.clone();
        let entry = kind.methods().upstream(method, kind.name())?;
        let body = entry.body().clone();
        body(self, args)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            queues: self.queues.clone(),
            events: self.events.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.queues = checkpoint.queues;
        self.events = checkpoint.events;
    }

    fn log_call(&mut self, method: &str, args: Vec<Value>) {
        let mut entry_args = Vec::with_capacity(args.len() + 1);
        entry_args.push(Value::String(method.to_string()));
        entry_args.extend(args);
        self.append(UpdateKind::Call, entry_args);
    }

    // Queues

    pub fn push_queue(&mut self, name: &str, args: Vec<Value>) -> QueueCounter {
        let counter = self.queues.push(name, args.clone(), self.clock);

        if self.is_authoritative() {
            let mut entry_args = Vec::with_capacity(args.len() + 1);
            entry_args.push(Value::String(name.to_string()));
            entry_args.extend(args);
            self.append(UpdateKind::PushQueue, entry_args);
        }

        counter
    }

    pub fn clear_queue(&mut self, name: &str) {
        self.queues.clear(name);

        if self.is_authoritative() {
            self.append(UpdateKind::ClearQueue, vec![Value::String(name.to_string())]);
        }
    }

    pub fn watch<F: FnMut(&[Value]) + 'static>(&mut self, name: &str, callback: F) {
        self.watch_listener(name, Rc::new(RefCell::new(callback)));
    }

    pub fn watch_listener(&mut self, name: &str, listener: QueueListener) {
        self.queues.watch(name, listener, self.clock);
    }

    /// Runs scheduled queue deliveries once their debounce has elapsed.
    pub fn deliver_queue_messages(&mut self, now: &Instant) -> usize {
        self.clock = *now;
        self.queues.deliver(now)
    }

    // Replication

    fn append(&mut self, kind: UpdateKind, args: Vec<Value>) {
        if self.call_depth > 0 {
            return;
        }
        debug!("Syncable {}({}) append `{}`", self.type_name(), self.id, kind);
        self.version = self.log.append(kind, args);
        self.broadcast_timer.arm(self.clock);
    }

    /// True once per debounce window after the last log append.
    pub fn broadcast_due(&mut self, now: &Instant) -> bool {
        self.clock = *now;
        self.broadcast_timer.take_ringing(now)
    }

    /// Applies one replicated entry. Does not touch `version`; see
    /// [`SyncableCore::apply_batch`].
    pub fn process_update(&mut self, entry: &LogEntry) -> Result<(), ProcessUpdateError> {
        if self.is_authoritative() {
            return Err(ProcessUpdateError::AuthoritativeSide);
        }

        match &entry.kind {
            UpdateKind::Set => {
                let key = leading_name(entry)?;
                let value = entry
                    .args
                    .get(1)
                    .cloned()
                    .ok_or_else(|| malformed(entry, "expected [key, value]"))?;
                self.set_property(&key, value);
            }
            UpdateKind::Call => {
                let method = leading_name(entry)?;
                let kind = self.kind.clone();
                let method_entry =
                    kind.methods()
                        .get(&method)
                        .ok_or_else(|| MethodError::UnknownMethod {
                            type_name: kind.name().to_string(),
                            method: method.clone(),
                        })?;
                let body = method_entry.body().clone();
                body(self, &entry.args[1..])?;
            }
            UpdateKind::PushQueue => {
                let name = leading_name(entry)?;
                self.queues
                    .push(&name, entry.args[1..].to_vec(), self.clock);
            }
            UpdateKind::ClearQueue => {
                let name = leading_name(entry)?;
                self.queues.clear(&name);
            }
            UpdateKind::Unknown(kind) => {
                return Err(ProcessUpdateError::UnknownUpdate {
                    kind: kind.clone(),
                    version: entry.version,
                });
            }
        }

        Ok(())
    }

    /// Applies every entry newer than the local version, in order, moving
    /// the local version along with each one. Entries already applied are
    /// skipped, so re-delivery of a batch is harmless. Returns how many
    /// entries were applied.
    pub fn apply_batch(&mut self, batch: &UpdateBatch) -> Result<usize, ProcessUpdateError> {
        let mut applied = 0;

        for entry in &batch.updates {
            if entry.version <= self.version {
                continue;
            }
            if entry.version != self.version + 1 {
                return Err(ProcessUpdateError::VersionGap {
                    local: self.version,
                    received: entry.version,
                });
            }

            self.process_update(entry)?;
            self.version = entry.version;
            applied += 1;
        }

        Ok(applied)
    }

    /// Snapshot without listeners or log.
    pub fn to_dry(&self) -> DrySyncable {
        let queues = self
            .queues
            .queues()
            .map(|queue| {
                (
                    queue.name().to_string(),
                    DryQueue {
                        messages: queue.messages().to_vec(),
                    },
                )
            })
            .collect();

        DrySyncable {
            type_name: self.type_name().to_string(),
            id: self.id.clone(),
            version: self.version,
            state: self.state.clone(),
            queues,
        }
    }
}

fn malformed(entry: &LogEntry, reason: &'static str) -> ProcessUpdateError {
    ProcessUpdateError::MalformedArgs {
        kind: entry.kind.to_string(),
        version: entry.version,
        reason,
    }
}

fn leading_name(entry: &LogEntry) -> Result<String, ProcessUpdateError> {
    match entry.args.first() {
        Some(Value::String(name)) => Ok(name.clone()),
        _ => Err(malformed(entry, "first argument must be a name")),
    }
}
