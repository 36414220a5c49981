//! ## flowmgr-core::device::manager
//! **Locked allocate/deref/free contract for one NIC**
//!
//! Every call takes the device lock for the duration of the bitmap or
//! refcount mutation, drops it, then logs the outcome. The lock is never held
//! across a call back into the manager.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::alloc::{AllocationStats, CapacityTable, FreeOutcome, PoolUsage, ResourcePool, ResourceTable};
use crate::device::flow::{FlowHandle, FlowResource};
use crate::error::ResourceError;
use crate::kind::ResourceKind;

#[derive(Debug)]
struct DeviceState {
    /// `None` once the device has been released.
    table: Option<ResourceTable>,
    flows: Vec<FlowHandle>,
    /// `None` once `u32::MAX` has been handed out.
    next_unique_id: Option<u32>,
}

impl DeviceState {
    fn table(&self) -> Result<&ResourceTable, ResourceError> {
        self.table.as_ref().ok_or(ResourceError::Released)
    }

    fn table_mut(&mut self) -> Result<&mut ResourceTable, ResourceError> {
        self.table.as_mut().ok_or(ResourceError::Released)
    }

    /// A flow may claim an entry only if some reference on it is not yet
    /// owned by another flow: the holders of an entry never exceed
    /// `ref_count + 1`.
    fn check_claims(&self, resources: &[FlowResource]) -> Result<(), ResourceError> {
        let table = self.table()?;
        for (position, res) in resources.iter().enumerate() {
            if resources[..position].contains(res) {
                return Err(ResourceError::DuplicateResource {
                    kind: res.kind,
                    index: res.index,
                });
            }
            let ref_count = table
                .pool_for(res.kind)
                .ref_count(res.index)
                .ok_or(ResourceError::NotAllocated {
                    kind: res.kind,
                    index: res.index,
                })?;
            let holders = self
                .flows
                .iter()
                .filter(|flow| flow.resources().contains(res))
                .count();
            if holders > ref_count as usize {
                return Err(ResourceError::NotShared {
                    kind: res.kind,
                    index: res.index,
                    holders,
                    ref_count,
                });
            }
        }
        Ok(())
    }

    fn take_unique_id(&mut self) -> Result<u32, ResourceError> {
        let id = self.next_unique_id.ok_or(ResourceError::UniqueIdExhausted)?;
        self.next_unique_id = id.checked_add(1);
        Ok(id)
    }
}

#[derive(Debug)]
pub struct DeviceResourceManager {
    adapter_no: u8,
    state: Mutex<DeviceState>,
    stats: AllocationStats,
}

impl DeviceResourceManager {
    pub fn new(adapter_no: u8, capacities: &CapacityTable) -> Self {
        Self {
            adapter_no,
            state: Mutex::new(DeviceState {
                table: Some(ResourceTable::new(capacities)),
                flows: Vec::new(),
                next_unique_id: Some(0),
            }),
            stats: AllocationStats::new(),
        }
    }

    pub fn adapter_no(&self) -> u8 {
        self.adapter_no
    }

    /// Lock-free allocation counters for this device.
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    fn with_pool<T>(
        &self,
        kind: ResourceKind,
        op: impl FnOnce(&mut ResourcePool) -> Result<T, ResourceError>,
    ) -> Result<T, ResourceError> {
        let mut state = self.state.lock();
        op(state.table_mut()?.pool_for_mut(kind))
    }

    pub fn allocate(&self, kind: ResourceKind, alignment: usize) -> Result<usize, ResourceError> {
        self.allocate_range(kind, 1, alignment)
    }

    /// Allocates `count` contiguous entries; see [`ResourcePool::allocate_range`].
    pub fn allocate_range(
        &self,
        kind: ResourceKind,
        count: usize,
        alignment: usize,
    ) -> Result<usize, ResourceError> {
        let result = self.with_pool(kind, |pool| pool.allocate_range(count, alignment));
        match &result {
            Ok(index) => {
                self.stats.record_allocations(kind, count);
                debug!(adapter = self.adapter_no, %kind, index, count, "mark resource used");
            }
            Err(err) => self.log_failure("allocate", kind, err),
        }
        result
    }

    /// Claims a specific entry, e.g. one reserved by the hardware.
    pub fn mark_used(&self, kind: ResourceKind, index: usize) -> Result<(), ResourceError> {
        let result = self.with_pool(kind, |pool| pool.mark_used(index));
        match &result {
            Ok(()) => {
                self.stats.record_allocations(kind, 1);
                debug!(adapter = self.adapter_no, %kind, index, "mark resource used");
            }
            Err(err) => self.log_failure("mark_used", kind, err),
        }
        result
    }

    /// Shares an allocated entry with one more owner. Returns the new count.
    pub fn deref(&self, kind: ResourceKind, index: usize) -> Result<u32, ResourceError> {
        let result = self.with_pool(kind, |pool| pool.deref(index));
        match &result {
            Ok(count) => {
                self.stats.record_deref(kind);
                debug!(adapter = self.adapter_no, %kind, index, ref_count = count, "reference resource");
            }
            Err(err) => self.log_failure("deref", kind, err),
        }
        result
    }

    pub fn free(&self, kind: ResourceKind, index: usize) -> Result<FreeOutcome, ResourceError> {
        let result = self.with_pool(kind, |pool| pool.free(index));
        self.log_free(kind, index, &result);
        result
    }

    pub fn is_used(&self, kind: ResourceKind, index: usize) -> bool {
        let state = self.state.lock();
        state
            .table()
            .map(|table| table.pool_for(kind).is_used(index))
            .unwrap_or(false)
    }

    pub fn ref_count(&self, kind: ResourceKind, index: usize) -> Option<u32> {
        let state = self.state.lock();
        state.table().ok()?.pool_for(kind).ref_count(index)
    }

    /// Next id for stamping a flow object. Strictly increasing; fails once
    /// the 32-bit space is used up instead of wrapping.
    pub fn next_unique_id(&self) -> Result<u32, ResourceError> {
        let result = {
            let mut state = self.state.lock();
            state.table()?;
            state.take_unique_id()
        };
        if let Err(err) = &result {
            warn!(adapter = self.adapter_no, error = %err, "unique id allocation failed");
        }
        result
    }

    /// Registers a flow owning one reference on each of `resources`.
    ///
    /// Every resource must be allocated, listed once, and have a reference
    /// no other flow owns yet: an entry already held by a flow has to be
    /// `deref`ed before the next flow can claim it. Returns the flow id.
    pub fn create_flow(&self, port: u8, resources: Vec<FlowResource>) -> Result<u32, ResourceError> {
        let result = {
            let mut state = self.state.lock();
            state.check_claims(&resources).and_then(|()| {
                let id = state.take_unique_id()?;
                state.flows.push(FlowHandle::new(id, port, resources));
                Ok(id)
            })
        };
        match &result {
            Ok(id) => debug!(adapter = self.adapter_no, port, flow = id, "flow created"),
            Err(err) => warn!(adapter = self.adapter_no, port, error = %err, "flow creation rejected"),
        }
        result
    }

    /// Unlinks a flow and frees its resources in reverse acquisition order.
    ///
    /// The flow is removed even if one of the frees fails; the first failure
    /// is returned.
    pub fn delete_flow(&self, id: u32) -> Result<FlowHandle, ResourceError> {
        let (flow, outcomes) = {
            let mut state = self.state.lock();
            let position = state
                .flows
                .iter()
                .position(|flow| flow.id() == id)
                .ok_or(ResourceError::FlowNotFound(id));
            let position = match position {
                Ok(position) => position,
                Err(err) => {
                    drop(state);
                    warn!(adapter = self.adapter_no, flow = id, "remove flow failed: unknown id");
                    return Err(err);
                }
            };
            let flow = state.flows.remove(position);
            let table = state.table_mut()?;
            let outcomes: Vec<_> = flow
                .resources()
                .iter()
                .rev()
                .map(|res| (*res, table.pool_for_mut(res.kind).free(res.index)))
                .collect();
            (flow, outcomes)
        };

        let mut first_error = None;
        for (res, outcome) in outcomes {
            self.log_free(res.kind, res.index, &outcome);
            if let Err(err) = outcome {
                first_error.get_or_insert(err);
            }
        }
        debug!(adapter = self.adapter_no, flow = id, "flow deleted");
        match first_error {
            Some(err) => Err(err),
            None => Ok(flow),
        }
    }

    pub fn flow_count(&self) -> usize {
        self.state.lock().flows.len()
    }

    /// Snapshot of the live flows in creation order.
    pub fn flows(&self) -> Vec<FlowHandle> {
        self.state.lock().flows.clone()
    }

    /// Per-kind occupancy. Empty once released.
    pub fn usage(&self) -> Vec<PoolUsage> {
        let state = self.state.lock();
        state.table().map(ResourceTable::usage).unwrap_or_default()
    }

    /// Drops the resource table. Refused while flows remain.
    pub fn release(&self) -> Result<(), ResourceError> {
        let result = {
            let mut state = self.state.lock();
            state.table()?;
            if state.flows.is_empty() {
                state.table = None;
                Ok(())
            } else {
                Err(ResourceError::FlowsRemaining(state.flows.len()))
            }
        };
        match &result {
            Ok(()) => info!(adapter = self.adapter_no, "resource table released"),
            Err(err) => warn!(adapter = self.adapter_no, error = %err, "resource table release refused"),
        }
        result
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().table.is_none()
    }

    fn log_free(&self, kind: ResourceKind, index: usize, result: &Result<FreeOutcome, ResourceError>) {
        match result {
            Ok(FreeOutcome::Released) => {
                self.stats.record_release(kind);
                debug!(adapter = self.adapter_no, %kind, index, "mark resource unused");
            }
            Ok(FreeOutcome::Dereferenced { remaining }) => {
                debug!(adapter = self.adapter_no, %kind, index, remaining, "de-reference resource");
            }
            Err(err) => self.log_failure("free", kind, err),
        }
    }

    fn log_failure(&self, op: &'static str, kind: ResourceKind, err: &ResourceError) {
        if err.is_exhaustion() {
            self.stats.record_exhausted(kind);
            warn!(adapter = self.adapter_no, %kind, op, "resource exhausted");
        } else {
            warn!(adapter = self.adapter_no, %kind, op, error = %err, "resource protocol violation");
        }
    }
}
