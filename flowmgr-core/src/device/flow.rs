//! Flow handles: logical rules consuming resource entries.

use serde::Serialize;

use crate::kind::ResourceKind;

/// One entry held by a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FlowResource {
    pub kind: ResourceKind,
    pub index: usize,
}

impl FlowResource {
    pub fn new(kind: ResourceKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// A flow rule registered on a device.
///
/// The handle owns one reference on every resource it lists; deleting the
/// flow frees each of them once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowHandle {
    id: u32,
    port: u8,
    resources: Vec<FlowResource>,
}

impl FlowHandle {
    pub(crate) fn new(id: u32, port: u8, resources: Vec<FlowResource>) -> Self {
        Self {
            id,
            port,
            resources,
        }
    }

    /// Device-unique id stamped at creation.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn resources(&self) -> &[FlowResource] {
        &self.resources
    }
}
