use thiserror::Error;

use crate::kind::ResourceKind;

/// Failures of the allocate/deref/free contract.
///
/// None of these are retried internally: given the same table state the same
/// request fails the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("{kind}: no free entry with alignment {alignment} (count {count})")]
    ResourceExhausted {
        kind: ResourceKind,
        count: usize,
        alignment: usize,
    },

    #[error("{kind}: index {index} out of range (capacity {capacity})")]
    InvalidIndex {
        kind: ResourceKind,
        index: usize,
        capacity: usize,
    },

    #[error("{kind}: index {index} is not allocated")]
    NotAllocated { kind: ResourceKind, index: usize },

    #[error("{kind}: index {index} is already allocated")]
    AlreadyAllocated { kind: ResourceKind, index: usize },

    /// Every reference on the entry already belongs to a flow; another owner
    /// has to `deref` it first.
    #[error("{kind}: index {index} has {holders} flow owners but reference count {ref_count}")]
    NotShared {
        kind: ResourceKind,
        index: usize,
        holders: usize,
        ref_count: u32,
    },

    #[error("{kind}: index {index} listed more than once in one flow")]
    DuplicateResource { kind: ResourceKind, index: usize },

    #[error("alignment {0} is not a non-zero power of two")]
    InvalidAlignment(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("{kind}: reference count overflow at index {index}")]
    RefCountOverflow { kind: ResourceKind, index: usize },

    #[error("flow {0} not found")]
    FlowNotFound(u32),

    #[error("{0} flows still reference this device")]
    FlowsRemaining(usize),

    #[error("unique id space exhausted")]
    UniqueIdExhausted,

    #[error("device resources have been released")]
    Released,
}

impl ResourceError {
    /// Code reported back through the flow API for this failure.
    pub fn nic_code(&self) -> NicErrorCode {
        match self {
            ResourceError::ResourceExhausted { .. } => NicErrorCode::MatchResourceExhaustion,
            ResourceError::FlowNotFound(_) => NicErrorCode::RemoveFlowFailed,
            _ => NicErrorCode::Failed,
        }
    }

    /// Exhaustion is the only outcome expected in correct operation.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, ResourceError::ResourceExhausted { .. })
    }
}

/// Numeric error codes surfaced to the flow API caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NicErrorCode {
    Success = 0,
    Failed = 1,
    OutputTooMany = 3,
    MatchInvalidOrUnsupportedElem = 12,
    MatchResourceExhaustion = 14,
    ActionUnsupported = 28,
    RemoveFlowFailed = 29,
    OutputInvalid = 33,
    ActionMultiplePortIdUnsupported = 40,
}

impl NicErrorCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn message(self) -> &'static str {
        match self {
            NicErrorCode::Success => "Operation successfully completed",
            NicErrorCode::Failed => "Operation failed",
            NicErrorCode::OutputTooMany => "Too many output destinations",
            NicErrorCode::MatchInvalidOrUnsupportedElem => {
                "Match element invalid or unsupported"
            }
            NicErrorCode::MatchResourceExhaustion => "Match failed because of resource exhaustion",
            NicErrorCode::ActionUnsupported => "Action unsupported",
            NicErrorCode::RemoveFlowFailed => "Removing flow failed",
            NicErrorCode::OutputInvalid => "Output destination invalid",
            NicErrorCode::ActionMultiplePortIdUnsupported => {
                "Multiple port_id actions in one flow are unsupported"
            }
        }
    }
}
