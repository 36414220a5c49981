//! Logical Ethernet ports bound to a NIC.
//!
//! A port never owns hardware resources; those stay with the parent
//! [`NicDevice`]. The port only keeps a weak link back to it.

use std::sync::{Arc, Weak};

use serde::Serialize;

use crate::nic::NicDevice;

/// Receive queues per port, not counting the exception queue at slot 0.
pub const MAX_QUEUES: usize = 128;

/// Application queue id and the hardware queue backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QueueId {
    pub id: u32,
    pub hw_id: u32,
}

/// Parameters for opening a port device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub port: u8,
    pub port_id: u32,
    pub rx_queues: Vec<QueueId>,
    pub rss_target_id: Option<u32>,
}

impl PortSpec {
    /// Port with no queues whose application id equals the NIC port number.
    pub fn new(port: u8) -> Self {
        Self {
            port,
            port_id: u32::from(port),
            rx_queues: Vec::new(),
            rss_target_id: None,
        }
    }

    pub fn with_port_id(mut self, port_id: u32) -> Self {
        self.port_id = port_id;
        self
    }

    pub fn with_queues(mut self, rx_queues: Vec<QueueId>) -> Self {
        self.rx_queues = rx_queues;
        self
    }

    pub fn with_rss_target(mut self, rss_target_id: u32) -> Self {
        self.rss_target_id = Some(rss_target_id);
        self
    }
}

#[derive(Debug)]
pub struct PortDevice {
    device: Weak<NicDevice>,
    adapter_no: u8,
    port: u8,
    port_id: u32,
    rx_queues: Vec<QueueId>,
    rss_target_id: Option<u32>,
}

impl PortDevice {
    pub(crate) fn new(device: &Arc<NicDevice>, spec: PortSpec) -> Self {
        Self {
            device: Arc::downgrade(device),
            adapter_no: device.adapter_no(),
            port: spec.port,
            port_id: spec.port_id,
            rx_queues: spec.rx_queues,
            rss_target_id: spec.rss_target_id,
        }
    }

    /// The owning NIC, if it is still alive.
    pub fn device(&self) -> Option<Arc<NicDevice>> {
        self.device.upgrade()
    }

    pub fn adapter_no(&self) -> u8 {
        self.adapter_no
    }

    /// NIC port number.
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Application-assigned port id.
    pub fn port_id(&self) -> u32 {
        self.port_id
    }

    /// Slot 0 is the exception queue when present.
    pub fn rx_queues(&self) -> &[QueueId] {
        &self.rx_queues
    }

    pub fn num_queues(&self) -> usize {
        self.rx_queues.len()
    }

    pub fn rss_target_id(&self) -> Option<u32> {
        self.rss_target_id
    }
}
