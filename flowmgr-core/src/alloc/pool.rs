//! ## flowmgr-core::alloc::pool
//! **Fixed-size hardware resource pools**
//!
//! A pool tracks one resource kind: an allocation bitmap plus a reference
//! count per entry. An entry is in use iff its bit is set; a non-zero
//! reference count implies the bit is set.

use crate::alloc::bitmap::AllocationBitmap;
use crate::error::ResourceError;
use crate::kind::ResourceKind;

/// Result of a successful [`ResourcePool::free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeOutcome {
    /// The bit was cleared and the entry can be allocated again.
    Released,
    /// Another owner still shares the entry; only the count went down.
    Dereferenced { remaining: u32 },
}

#[derive(Debug, Clone)]
pub struct ResourcePool {
    kind: ResourceKind,
    bitmap: AllocationBitmap,
    ref_counts: Box<[u32]>,
}

impl ResourcePool {
    pub fn new(kind: ResourceKind, capacity: usize) -> Self {
        Self {
            kind,
            bitmap: AllocationBitmap::new(capacity),
            ref_counts: vec![0u32; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Total number of addressable entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bitmap.len()
    }

    /// Number of entries currently allocated.
    pub fn in_use(&self) -> usize {
        self.bitmap.count_ones()
    }

    /// Allocates the first free entry whose index is a multiple of `alignment`.
    pub fn allocate(&mut self, alignment: usize) -> Result<usize, ResourceError> {
        self.allocate_range(1, alignment)
    }

    /// Allocates `count` contiguous entries starting at a multiple of
    /// `alignment` and returns the first index.
    ///
    /// Every entry in the run starts with a reference count of zero.
    pub fn allocate_range(&mut self, count: usize, alignment: usize) -> Result<usize, ResourceError> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(ResourceError::InvalidAlignment(alignment));
        }
        if count == 0 {
            return Err(ResourceError::InvalidArgument("allocation count must be non-zero"));
        }

        let capacity = self.capacity();
        let mut start = 0usize;
        while count <= capacity && start <= capacity - count {
            match self.bitmap.last_set_in(start, count) {
                None => {
                    for index in start..start + count {
                        self.bitmap.set(index);
                        self.ref_counts[index] = 0;
                    }
                    return Ok(start);
                }
                // Every aligned start at or below `used` overlaps it.
                Some(used) => start = (used / alignment + 1) * alignment,
            }
        }

        Err(ResourceError::ResourceExhausted {
            kind: self.kind,
            count,
            alignment,
        })
    }

    /// Claims a specific entry chosen by the caller.
    pub fn mark_used(&mut self, index: usize) -> Result<(), ResourceError> {
        self.check_index(index)?;
        if self.bitmap.test(index) {
            return Err(ResourceError::AlreadyAllocated {
                kind: self.kind,
                index,
            });
        }
        self.bitmap.set(index);
        self.ref_counts[index] = 0;
        Ok(())
    }

    /// Adds an owner to an allocated entry and returns the new count.
    pub fn deref(&mut self, index: usize) -> Result<u32, ResourceError> {
        self.check_allocated(index)?;
        let count = self.ref_counts[index]
            .checked_add(1)
            .ok_or(ResourceError::RefCountOverflow {
                kind: self.kind,
                index,
            })?;
        self.ref_counts[index] = count;
        Ok(count)
    }

    /// Drops one owner; clears the entry once no extra owners remain.
    pub fn free(&mut self, index: usize) -> Result<FreeOutcome, ResourceError> {
        self.check_allocated(index)?;
        match self.ref_counts[index] {
            0 => {
                self.bitmap.clear(index);
                Ok(FreeOutcome::Released)
            }
            count => {
                self.ref_counts[index] = count - 1;
                Ok(FreeOutcome::Dereferenced {
                    remaining: count - 1,
                })
            }
        }
    }

    /// Whether `index` is allocated. Out-of-range indices are never in use.
    #[inline]
    pub fn is_used(&self, index: usize) -> bool {
        index < self.capacity() && self.bitmap.test(index)
    }

    /// Reference count of an allocated entry.
    pub fn ref_count(&self, index: usize) -> Option<u32> {
        self.is_used(index).then(|| self.ref_counts[index])
    }

    /// Indices of all allocated entries, ascending.
    pub fn used_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bitmap.iter_ones()
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), ResourceError> {
        if index < self.capacity() {
            Ok(())
        } else {
            Err(ResourceError::InvalidIndex {
                kind: self.kind,
                index,
                capacity: self.capacity(),
            })
        }
    }

    #[inline]
    fn check_allocated(&self, index: usize) -> Result<(), ResourceError> {
        self.check_index(index)?;
        if self.bitmap.test(index) {
            Ok(())
        } else {
            Err(ResourceError::NotAllocated {
                kind: self.kind,
                index,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> ResourcePool {
        ResourcePool::new(ResourceKind::CatCfn, capacity)
    }

    #[test]
    fn test_pool_allocate_until_exhausted() {
        let mut pool = pool(4);
        let mut indices: Vec<_> = (0..4).map(|_| pool.allocate(1).unwrap()).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(pool.in_use(), 4);
        assert!(pool.allocate(1).unwrap_err().is_exhaustion());
    }

    #[test]
    fn test_pool_aligned_allocation() {
        let mut pool = pool(8);
        assert_eq!(pool.allocate(4), Ok(0));
        assert_eq!(pool.allocate(4), Ok(4));
        assert_eq!(
            pool.allocate(4),
            Err(ResourceError::ResourceExhausted {
                kind: ResourceKind::CatCfn,
                count: 1,
                alignment: 4,
            })
        );
        // Unaligned requests still find the gaps.
        assert_eq!(pool.allocate(1), Ok(1));
    }

    #[test]
    fn test_pool_alignment_skips_used_slots() {
        let mut pool = pool(16);
        pool.mark_used(0).unwrap();
        pool.mark_used(9).unwrap();
        assert_eq!(pool.allocate(8), Ok(8));
        assert!(pool.allocate(8).unwrap_err().is_exhaustion());
    }

    #[test]
    fn test_pool_rejects_bad_alignment() {
        let mut pool = pool(8);
        assert_eq!(pool.allocate(0), Err(ResourceError::InvalidAlignment(0)));
        assert_eq!(pool.allocate(3), Err(ResourceError::InvalidAlignment(3)));
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_pool_free_without_deref_clears_bit() {
        let mut pool = pool(8);
        let index = pool.allocate(1).unwrap();
        assert!(pool.is_used(index));
        assert_eq!(pool.free(index), Ok(FreeOutcome::Released));
        assert!(!pool.is_used(index));
        assert_eq!(pool.allocate(1), Ok(index));
    }

    #[test]
    fn test_pool_deref_then_free_keeps_bit_until_last_owner() {
        let mut pool = pool(8);
        for i in 0..3 {
            pool.mark_used(i).unwrap();
        }
        assert_eq!(pool.allocate(1), Ok(3));
        assert_eq!(pool.deref(3), Ok(1));
        assert_eq!(pool.free(3), Ok(FreeOutcome::Dereferenced { remaining: 0 }));
        assert!(pool.is_used(3));
        assert_eq!(pool.ref_count(3), Some(0));
        assert_eq!(pool.free(3), Ok(FreeOutcome::Released));
        assert!(!pool.is_used(3));
        assert_eq!(pool.ref_count(3), None);
    }

    #[test]
    fn test_pool_double_free_is_rejected() {
        let mut pool = pool(8);
        let index = pool.allocate(1).unwrap();
        pool.free(index).unwrap();
        assert_eq!(
            pool.free(index),
            Err(ResourceError::NotAllocated {
                kind: ResourceKind::CatCfn,
                index
            })
        );
    }

    #[test]
    fn test_pool_out_of_range() {
        let mut pool = pool(8);
        let expected = ResourceError::InvalidIndex {
            kind: ResourceKind::CatCfn,
            index: 8,
            capacity: 8,
        };
        assert_eq!(pool.deref(8), Err(expected.clone()));
        assert_eq!(pool.free(8), Err(expected.clone()));
        assert_eq!(pool.mark_used(8), Err(expected));
        assert!(!pool.is_used(8));
    }

    #[test]
    fn test_pool_deref_unallocated() {
        let mut pool = pool(8);
        assert_eq!(
            pool.deref(2),
            Err(ResourceError::NotAllocated {
                kind: ResourceKind::CatCfn,
                index: 2
            })
        );
    }

    #[test]
    fn test_pool_allocate_range_finds_aligned_run() {
        let mut pool = pool(16);
        pool.mark_used(1).unwrap();
        pool.mark_used(6).unwrap();
        // 0..4 and 4..8 are blocked, 8..12 is free.
        assert_eq!(pool.allocate_range(4, 4), Ok(8));
        assert_eq!(pool.in_use(), 6);
        assert_eq!(pool.allocate_range(4, 4), Ok(12));
        assert!(pool.allocate_range(4, 4).unwrap_err().is_exhaustion());
        // Unaligned run of two fits at 2..4.
        assert_eq!(pool.allocate_range(2, 1), Ok(2));
    }

    #[test]
    fn test_pool_allocate_range_larger_than_capacity() {
        let mut pool = pool(4);
        assert!(pool.allocate_range(5, 1).unwrap_err().is_exhaustion());
        assert_eq!(
            pool.allocate_range(0, 1),
            Err(ResourceError::InvalidArgument("allocation count must be non-zero"))
        );
    }

    #[test]
    fn test_pool_zero_capacity_is_always_exhausted() {
        let mut pool = pool(0);
        assert!(pool.allocate(1).unwrap_err().is_exhaustion());
        assert!(!pool.is_used(0));
    }

    #[test]
    fn test_pool_mark_used_twice() {
        let mut pool = pool(4);
        pool.mark_used(2).unwrap();
        assert_eq!(
            pool.mark_used(2),
            Err(ResourceError::AlreadyAllocated {
                kind: ResourceKind::CatCfn,
                index: 2
            })
        );
        assert_eq!(pool.used_indices().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_pool_reallocation_resets_refcount() {
        let mut pool = pool(2);
        let index = pool.allocate(1).unwrap();
        pool.deref(index).unwrap();
        pool.free(index).unwrap();
        pool.free(index).unwrap();
        assert_eq!(pool.allocate(1), Ok(index));
        assert_eq!(pool.ref_count(index), Some(0));
    }
}
