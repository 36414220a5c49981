//! ## flowmgr-core::alloc::stats
//! **Allocation statistics per resource kind**
//!
//! Counters are atomics so they can be read without taking the device lock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::kind::ResourceKind;

#[derive(Debug, Default)]
pub struct KindStats {
    allocations: AtomicU64,
    releases: AtomicU64,
    derefs: AtomicU64,
    exhausted: AtomicU64,
}

impl KindStats {
    /// Entries claimed by allocate, allocate_range or mark_used.
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Frees that cleared the bit.
    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    pub fn derefs(&self) -> u64 {
        self.derefs.load(Ordering::Relaxed)
    }

    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }
}

/// Counters for every kind on one device.
#[derive(Debug, Default)]
pub struct AllocationStats {
    kinds: [KindStats; ResourceKind::COUNT],
}

impl AllocationStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn kind(&self, kind: ResourceKind) -> &KindStats {
        &self.kinds[kind.index()]
    }

    #[inline]
    pub fn record_allocations(&self, kind: ResourceKind, count: usize) {
        self.kind(kind)
            .allocations
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_release(&self, kind: ResourceKind) {
        self.kind(kind).releases.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_deref(&self, kind: ResourceKind) {
        self.kind(kind).derefs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_exhausted(&self, kind: ResourceKind) {
        self.kind(kind).exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Rejected allocations summed over all kinds.
    pub fn total_exhausted(&self) -> u64 {
        self.kinds.iter().map(KindStats::exhausted).sum()
    }
}
