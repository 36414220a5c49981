use flowmgr_core::{OffloadProfile, ResourceError};
use thiserror::Error;

use crate::lifecycle::DeviceState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("adapter {0} is already registered")]
    DuplicateAdapter(u8),

    #[error("no capacity table for profile {0}")]
    UnknownProfile(OffloadProfile),

    #[error("adapter {0} is not registered")]
    DeviceNotFound(u8),

    #[error("adapter {adapter_no} is {state}, expected active")]
    DeviceNotActive { adapter_no: u8, state: DeviceState },

    #[error("adapter {adapter_no} busy: {flows} flows and {ports} ports remain")]
    DeviceBusy {
        adapter_no: u8,
        flows: usize,
        ports: usize,
    },

    #[error("illegal lifecycle transition {from} -> {to}")]
    IllegalTransition { from: DeviceState, to: DeviceState },

    #[error("port {port} out of range on adapter {adapter_no} ({port_count} ports)")]
    PortOutOfRange {
        adapter_no: u8,
        port: u8,
        port_count: u16,
    },

    #[error("port {port} already open on adapter {adapter_no}")]
    PortExists { adapter_no: u8, port: u8 },

    #[error("port {port} not found on adapter {adapter_no}")]
    PortNotFound { adapter_no: u8, port: u8 },

    #[error("{requested} queues requested, at most {max} supported")]
    TooManyQueues { requested: usize, max: usize },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
