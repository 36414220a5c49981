//! ## flowmgr-core::alloc
//! **Allocation bitmaps and per-kind resource pools**
//!
//! ### Key Submodules:
//! - `bitmap/`: fixed-length bit set, one bit per hardware entry
//! - `pool/`: bitmap plus reference counts for a single resource kind
//! - `table/`: one pool per resource kind, sized from a capacity table
//! - `stats/`: lock-free allocation counters per kind
//!
//! Nothing in here locks. Callers serialize access through
//! [`DeviceResourceManager`](crate::DeviceResourceManager).

pub mod bitmap;
pub mod pool;
pub mod stats;
pub mod table;

pub use bitmap::AllocationBitmap;
pub use pool::{FreeOutcome, ResourcePool};
pub use stats::{AllocationStats, KindStats};
pub use table::{CapacityTable, PoolUsage, ResourceTable};
