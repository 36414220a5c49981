//! NIC devices: adapter identity, lifecycle, resources and open ports.

use std::sync::Arc;

use flowmgr_core::{CapacityTable, DeviceResourceManager, OffloadProfile};
use parking_lot::Mutex;

use crate::error::RegistryError;
use crate::lifecycle::DeviceState;
use crate::port::PortDevice;
use crate::snapshot::{DeviceSnapshot, PortSnapshot};

#[derive(Debug)]
pub struct NicDevice {
    adapter_no: u8,
    port_count: u16,
    profile: OffloadProfile,
    state: Mutex<DeviceState>,
    resources: DeviceResourceManager,
    /// Mutated only while the registry lock is held.
    ports: Mutex<Vec<Arc<PortDevice>>>,
}

impl NicDevice {
    pub(crate) fn new(
        adapter_no: u8,
        port_count: u16,
        profile: OffloadProfile,
        capacities: &CapacityTable,
    ) -> Self {
        Self {
            adapter_no,
            port_count,
            profile,
            state: Mutex::new(DeviceState::Uninitialized),
            resources: DeviceResourceManager::new(adapter_no, capacities),
            ports: Mutex::new(Vec::new()),
        }
    }

    /// Physical adapter number in the host.
    pub fn adapter_no(&self) -> u8 {
        self.adapter_no
    }

    /// Number of in-ports addressable on this NIC.
    pub fn port_count(&self) -> u16 {
        self.port_count
    }

    pub fn profile(&self) -> OffloadProfile {
        self.profile
    }

    pub fn state(&self) -> DeviceState {
        *self.state.lock()
    }

    /// Allocation contract for this device.
    pub fn resources(&self) -> &DeviceResourceManager {
        &self.resources
    }

    /// Open ports in creation order.
    pub fn ports(&self) -> Vec<Arc<PortDevice>> {
        self.ports.lock().clone()
    }

    pub fn port(&self, port: u8) -> Option<Arc<PortDevice>> {
        self.ports.lock().iter().find(|p| p.port() == port).cloned()
    }

    pub fn flow_count(&self) -> usize {
        self.resources.flow_count()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            adapter_no: self.adapter_no,
            port_count: self.port_count,
            profile: self.profile,
            state: self.state(),
            ports: self.ports().iter().map(|p| PortSnapshot::from(p.as_ref())).collect(),
            flows: self.flow_count(),
            usage: self
                .resources
                .usage()
                .into_iter()
                .filter(|usage| usage.capacity > 0)
                .collect(),
        }
    }

    pub(crate) fn set_state(&self, to: DeviceState) -> Result<DeviceState, RegistryError> {
        let mut state = self.state.lock();
        *state = state.transition(to)?;
        Ok(*state)
    }

    pub(crate) fn require_active(&self) -> Result<(), RegistryError> {
        match self.state() {
            DeviceState::Active => Ok(()),
            state => Err(RegistryError::DeviceNotActive {
                adapter_no: self.adapter_no,
                state,
            }),
        }
    }

    pub(crate) fn ports_mut(&self) -> parking_lot::MutexGuard<'_, Vec<Arc<PortDevice>>> {
        self.ports.lock()
    }
}
