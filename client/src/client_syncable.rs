use syncable_shared::SyncableCore;

use crate::UpstreamGateway;

/// A replica and the link it is mirrored over.
pub struct ClientSyncable {
    core: SyncableCore,
    gateway: UpstreamGateway,
}

impl ClientSyncable {
    pub fn new(core: SyncableCore, gateway: UpstreamGateway) -> Self {
        Self { core, gateway }
    }

    pub fn core(&self) -> &SyncableCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut SyncableCore {
        &mut self.core
    }

    pub fn gateway(&self) -> &UpstreamGateway {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut UpstreamGateway {
        &mut self.gateway
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut SyncableCore, &mut UpstreamGateway) {
        (&mut self.core, &mut self.gateway)
    }
}
