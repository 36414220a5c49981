//! ## flowmgr-core::alloc::table
//! **One resource pool per resource kind**
//!
//! Built once from a [`CapacityTable`] when the owning device is created and
//! never resized afterwards.

use serde::Serialize;

use crate::alloc::pool::ResourcePool;
use crate::kind::ResourceKind;

/// Entry count per resource kind for one hardware profile.
///
/// Kinds that are never set have capacity zero and always report exhaustion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityTable {
    capacities: [usize; ResourceKind::COUNT],
}

impl CapacityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: ResourceKind, capacity: usize) -> Self {
        self.set(kind, capacity);
        self
    }

    pub fn set(&mut self, kind: ResourceKind, capacity: usize) {
        self.capacities[kind.index()] = capacity;
    }

    #[inline]
    pub fn get(&self, kind: ResourceKind) -> usize {
        self.capacities[kind.index()]
    }

    /// Same capacity for every kind.
    pub fn uniform(capacity: usize) -> Self {
        Self {
            capacities: [capacity; ResourceKind::COUNT],
        }
    }
}

impl FromIterator<(ResourceKind, usize)> for CapacityTable {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, usize)>>(iter: I) -> Self {
        let mut table = CapacityTable::new();
        for (kind, capacity) in iter {
            table.set(kind, capacity);
        }
        table
    }
}

/// Occupancy of a single pool at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolUsage {
    pub kind: ResourceKind,
    pub capacity: usize,
    pub in_use: usize,
}

#[derive(Debug, Clone)]
pub struct ResourceTable {
    pools: Vec<ResourcePool>,
}

impl ResourceTable {
    pub fn new(capacities: &CapacityTable) -> Self {
        let pools = ResourceKind::ALL
            .iter()
            .map(|&kind| ResourcePool::new(kind, capacities.get(kind)))
            .collect();
        Self { pools }
    }

    #[inline]
    pub fn pool_for(&self, kind: ResourceKind) -> &ResourcePool {
        &self.pools[kind.index()]
    }

    #[inline]
    pub fn pool_for_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        &mut self.pools[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourcePool> {
        self.pools.iter()
    }

    pub fn usage(&self) -> Vec<PoolUsage> {
        self.pools
            .iter()
            .map(|pool| PoolUsage {
                kind: pool.kind(),
                capacity: pool.capacity(),
                in_use: pool.in_use(),
            })
            .collect()
    }

    /// Total allocated entries across all kinds.
    pub fn in_use(&self) -> usize {
        self.pools.iter().map(ResourcePool::in_use).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes_pools_from_capacities() {
        let capacities = CapacityTable::new()
            .with(ResourceKind::CatCfn, 64)
            .with(ResourceKind::HshRcp, 32);
        let table = ResourceTable::new(&capacities);

        assert_eq!(table.pool_for(ResourceKind::CatCfn).capacity(), 64);
        assert_eq!(table.pool_for(ResourceKind::HshRcp).capacity(), 32);
        assert_eq!(table.pool_for(ResourceKind::Queue).capacity(), 0);
        for pool in table.iter() {
            assert_eq!(table.pool_for(pool.kind()).kind(), pool.kind());
        }
    }

    #[test]
    fn test_table_pools_are_independent() {
        let mut table = ResourceTable::new(&CapacityTable::uniform(4));
        table.pool_for_mut(ResourceKind::CatCot).allocate(1).unwrap();
        table.pool_for_mut(ResourceKind::CatCot).allocate(1).unwrap();
        table.pool_for_mut(ResourceKind::TpeRcp).allocate(1).unwrap();

        let usage = table.usage();
        assert_eq!(usage.len(), ResourceKind::COUNT);
        assert_eq!(usage[ResourceKind::CatCot.index()].in_use, 2);
        assert_eq!(usage[ResourceKind::TpeRcp.index()].in_use, 1);
        assert_eq!(usage[ResourceKind::CatCfn.index()].in_use, 0);
        assert_eq!(table.in_use(), 3);
    }

    #[test]
    fn test_capacity_table_from_iter() {
        let table: CapacityTable = [(ResourceKind::Queue, 128), (ResourceKind::FlmRcp, 16)]
            .into_iter()
            .collect();
        assert_eq!(table.get(ResourceKind::Queue), 128);
        assert_eq!(table.get(ResourceKind::FlmRcp), 16);
        assert_eq!(table.get(ResourceKind::CatExo), 0);
    }
}
