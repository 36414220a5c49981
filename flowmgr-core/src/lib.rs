//! # flowmgr-core
//!
//! Resource allocation layer for the flow offload manager.
//!
//! Every NIC exposes a fixed set of hardware tables (categorizer functions,
//! hasher recipes, queue selectors, ...). Flow rules claim entries in those
//! tables; this crate keeps track of which entries are taken and how many rules
//! share each one.
//!
//! ### Key Submodules:
//! - `alloc`: allocation bitmap, per-kind pools, the per-device table and counters
//! - `device`: the locked per-device manager and the flow handles it owns
//! - `backend`: offload profiles and the capacity tables a backend supplies
//!
//! ### Guarantees:
//! - No two owners hold the same entry unless it was shared through `deref`
//! - Allocated indices honour the requested power-of-two alignment
//! - Protocol violations (double free, stale index) surface as errors, never panics

pub mod alloc;
pub mod backend;
pub mod device;
pub mod error;
pub mod kind;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::backend::*;
    pub use crate::device::*;
    pub use crate::error::*;
    pub use crate::kind::*;
}

pub use alloc::{CapacityTable, FreeOutcome, PoolUsage, ResourcePool, ResourceTable};
pub use backend::{CapacityProvider, OffloadProfile};
pub use device::{DeviceResourceManager, FlowHandle, FlowResource};
pub use error::{NicErrorCode, ResourceError};
pub use kind::{ParseKindError, ResourceKind};
