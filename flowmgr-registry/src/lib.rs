//! # flowmgr-registry
//!
//! Live NIC devices and their Ethernet port devices.
//!
//! The registry is consulted when adapters and ports come and go, never on
//! the allocation hot path: once a caller holds an `Arc<NicDevice>` it talks
//! to the device's [`DeviceResourceManager`](flowmgr_core::DeviceResourceManager)
//! directly.

pub mod error;
pub mod lifecycle;
pub mod nic;
pub mod port;
pub mod registry;
pub mod snapshot;

pub use error::RegistryError;
pub use lifecycle::DeviceState;
pub use nic::NicDevice;
pub use port::{PortDevice, PortSpec, QueueId, MAX_QUEUES};
pub use registry::DeviceRegistry;
pub use snapshot::{DeviceSnapshot, PortSnapshot};
