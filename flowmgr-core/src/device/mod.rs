//! ## flowmgr-core::device
//! **Per-device resource manager and flow bookkeeping**
//!
//! Each NIC is an independent concurrency domain: one lock guards its
//! resource table, its flow list and its unique-id counter.

pub mod flow;
pub mod manager;

pub use flow::{FlowHandle, FlowResource};
pub use manager::DeviceResourceManager;
