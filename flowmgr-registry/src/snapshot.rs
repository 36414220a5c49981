//! Serializable views for debug traversal.

use flowmgr_core::{OffloadProfile, PoolUsage};
use serde::Serialize;

use crate::lifecycle::DeviceState;
use crate::port::PortDevice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSnapshot {
    pub port: u8,
    pub port_id: u32,
    pub queues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss_target_id: Option<u32>,
}

impl From<&PortDevice> for PortSnapshot {
    fn from(port: &PortDevice) -> Self {
        Self {
            port: port.port(),
            port_id: port.port_id(),
            queues: port.num_queues(),
            rss_target_id: port.rss_target_id(),
        }
    }
}

/// State of one NIC at the time of the dump. Pools with zero capacity are
/// left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub adapter_no: u8,
    pub port_count: u16,
    pub profile: OffloadProfile,
    pub state: DeviceState,
    pub ports: Vec<PortSnapshot>,
    pub flows: usize,
    pub usage: Vec<PoolUsage>,
}
