use log::debug;

use syncable_shared::{
    submit_message, Link, LinkError, SessionKey, SyncableCore, UpdateBatch, Version,
    PROCESS_UPDATES_EVENT,
};

// LinkKey
/// Identifies one attached link for as long as the Server keeps it.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct LinkKey(u64);

impl LinkKey {
    pub fn to_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(value: u64) -> Self {
        LinkKey(value)
    }
}

/// One remote replica's cursor into a Syncable's log.
pub struct LinkSession {
    link: Box<dyn Link>,
    acknowledged_version: Version,
    transport_session: SessionKey,
}

impl LinkSession {
    pub fn new(link: Box<dyn Link>, acknowledged_version: Version, transport_session: SessionKey) -> Self {
        Self {
            link,
            acknowledged_version,
            transport_session,
        }
    }

    pub fn acknowledged_version(&self) -> Version {
        self.acknowledged_version
    }

    pub fn transport_session(&self) -> &SessionKey {
        &self.transport_session
    }

    pub fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    /// Pushes every entry the replica has not acknowledged as one batch.
    /// Nothing is sent to a replica that is caught up. The cursor only moves
    /// once the link accepted the batch. Returns how many entries were sent.
    pub fn push_updates(&mut self, core: &SyncableCore) -> Result<usize, LinkError> {
        let updates = core.entries_since(self.acknowledged_version);
        if updates.is_empty() {
            return Ok(0);
        }

        let batch = UpdateBatch {
            updates: updates.to_vec(),
            version: core.version(),
        };
        submit_message(self.link.as_mut(), PROCESS_UPDATES_EVENT, &batch)?;

        debug!(
            "Pushed {} update(s) of {}({}) from version {} to {}",
            batch.updates.len(),
            core.type_name(),
            core.id(),
            self.acknowledged_version,
            batch.version
        );
        self.acknowledged_version = batch.version;

        Ok(batch.updates.len())
    }

    pub fn close(&mut self) {
        if !self.link.is_destroyed() {
            self.link.destroy();
        }
    }
}
