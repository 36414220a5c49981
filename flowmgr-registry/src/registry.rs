//! ## flowmgr-registry::registry
//! **Create/destroy lifecycle for NICs and their ports**
//!
//! Devices are kept in insertion order; traversal is first-created,
//! first-visited. The registry lock is taken only for device and port
//! creation and teardown.

use std::sync::Arc;

use flowmgr_core::{CapacityProvider, OffloadProfile, ResourceError};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::lifecycle::DeviceState;
use crate::nic::NicDevice;
use crate::port::{PortDevice, PortSpec, MAX_QUEUES};
use crate::snapshot::DeviceSnapshot;

pub struct DeviceRegistry {
    provider: Box<dyn CapacityProvider + Send + Sync>,
    devices: RwLock<Vec<Arc<NicDevice>>>,
}

impl DeviceRegistry {
    /// `provider` supplies the capacity table for each offload profile.
    pub fn new(provider: impl CapacityProvider + Send + Sync + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            devices: RwLock::new(Vec::new()),
        }
    }

    /// Registers a NIC and builds its resource table from `profile`.
    pub fn create_device(
        &self,
        adapter_no: u8,
        port_count: u16,
        profile: OffloadProfile,
    ) -> Result<Arc<NicDevice>, RegistryError> {
        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.adapter_no() == adapter_no) {
            return Err(RegistryError::DuplicateAdapter(adapter_no));
        }
        let capacities = self
            .provider
            .capacity_table(profile)
            .ok_or(RegistryError::UnknownProfile(profile))?;

        let device = Arc::new(NicDevice::new(adapter_no, port_count, profile, &capacities));
        device.set_state(DeviceState::Active)?;
        devices.push(Arc::clone(&device));

        info!(adapter = adapter_no, ports = port_count, %profile, "nic device created");
        Ok(device)
    }

    /// Opens a port on an active device.
    pub fn create_port(
        &self,
        device: &Arc<NicDevice>,
        spec: PortSpec,
    ) -> Result<Arc<PortDevice>, RegistryError> {
        let _devices = self.devices.write();
        device.require_active()?;

        let adapter_no = device.adapter_no();
        if u16::from(spec.port) >= device.port_count() {
            return Err(RegistryError::PortOutOfRange {
                adapter_no,
                port: spec.port,
                port_count: device.port_count(),
            });
        }
        // One extra slot for the exception queue.
        if spec.rx_queues.len() > MAX_QUEUES + 1 {
            return Err(RegistryError::TooManyQueues {
                requested: spec.rx_queues.len(),
                max: MAX_QUEUES + 1,
            });
        }

        let mut ports = device.ports_mut();
        if ports.iter().any(|p| p.port() == spec.port) {
            return Err(RegistryError::PortExists {
                adapter_no,
                port: spec.port,
            });
        }
        let port = Arc::new(PortDevice::new(device, spec));
        ports.push(Arc::clone(&port));

        info!(
            adapter = adapter_no,
            port = port.port(),
            port_id = port.port_id(),
            queues = port.num_queues(),
            "eth port device created"
        );
        Ok(port)
    }

    /// Closes the port numbered `port` on `device`.
    pub fn delete_port(
        &self,
        device: &Arc<NicDevice>,
        port: u8,
    ) -> Result<Arc<PortDevice>, RegistryError> {
        let _devices = self.devices.write();
        let mut ports = device.ports_mut();
        let position = ports
            .iter()
            .position(|p| p.port() == port)
            .ok_or(RegistryError::PortNotFound {
                adapter_no: device.adapter_no(),
                port,
            })?;
        let removed = ports.remove(position);

        info!(adapter = device.adapter_no(), port, "eth port device deleted");
        Ok(removed)
    }

    /// Tears a device down once its flows and ports are gone.
    ///
    /// On refusal the device stays active and registered.
    pub fn destroy_device(&self, device: &Arc<NicDevice>) -> Result<(), RegistryError> {
        let mut devices = self.devices.write();
        let adapter_no = device.adapter_no();
        let position = devices
            .iter()
            .position(|d| Arc::ptr_eq(d, device))
            .ok_or(RegistryError::DeviceNotFound(adapter_no))?;

        let ports = device.ports_mut().len();
        if ports > 0 {
            let flows = device.flow_count();
            warn!(adapter = adapter_no, flows, ports, "nic device destroy refused");
            return Err(RegistryError::DeviceBusy {
                adapter_no,
                flows,
                ports,
            });
        }

        device.set_state(DeviceState::Draining)?;
        // release re-checks the flow list under the device lock.
        if let Err(err) = device.resources().release() {
            device.set_state(DeviceState::Active)?;
            return Err(match err {
                ResourceError::FlowsRemaining(flows) => {
                    warn!(adapter = adapter_no, flows, "nic device destroy refused");
                    RegistryError::DeviceBusy {
                        adapter_no,
                        flows,
                        ports: 0,
                    }
                }
                other => other.into(),
            });
        }
        device.set_state(DeviceState::Destroyed)?;
        devices.remove(position);

        info!(adapter = adapter_no, "nic device destroyed");
        Ok(())
    }

    pub fn find_device(&self, adapter_no: u8) -> Option<Arc<NicDevice>> {
        self.devices
            .read()
            .iter()
            .find(|d| d.adapter_no() == adapter_no)
            .cloned()
    }

    /// Live devices in creation order.
    pub fn devices(&self) -> Vec<Arc<NicDevice>> {
        self.devices.read().clone()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Debug dump of every live device.
    pub fn snapshot(&self) -> Vec<DeviceSnapshot> {
        self.devices().iter().map(|d| d.snapshot()).collect()
    }
}
