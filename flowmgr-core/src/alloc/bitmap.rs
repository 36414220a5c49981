//! ## flowmgr-core::alloc::bitmap
//! **Fixed-length allocation bit set**
//!
//! One bit per entry, `1` meaning allocated. The length is fixed at
//! construction and bits past it are never touched.

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationBitmap {
    words: Box<[u64]>,
    len: usize,
}

impl AllocationBitmap {
    /// Creates a bitmap of `len` clear bits.
    pub fn new(len: usize) -> Self {
        let words = vec![0u64; len.div_ceil(WORD_BITS)].into_boxed_slice();
        Self { words, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn locate(&self, bit: usize) -> (usize, u64) {
        debug_assert!(bit < self.len, "bit {} out of range {}", bit, self.len);
        (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
    }

    #[inline]
    pub fn set(&mut self, bit: usize) {
        let (word, mask) = self.locate(bit);
        self.words[word] |= mask;
    }

    #[inline]
    pub fn clear(&mut self, bit: usize) {
        let (word, mask) = self.locate(bit);
        self.words[word] &= !mask;
    }

    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        let (word, mask) = self.locate(bit);
        self.words[word] & mask != 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Last set bit in `start..start + count`, if any.
    pub fn last_set_in(&self, start: usize, count: usize) -> Option<usize> {
        (start..start + count).rev().find(|&bit| self.test(bit))
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(w, &word)| {
                let mut rest = word;
                std::iter::from_fn(move || {
                    if rest == 0 {
                        return None;
                    }
                    let bit = rest.trailing_zeros() as usize;
                    rest &= rest - 1;
                    Some(w * WORD_BITS + bit)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_test() {
        let mut bm = AllocationBitmap::new(130);
        assert!(!bm.test(0));
        bm.set(0);
        bm.set(64);
        bm.set(129);
        assert!(bm.test(0) && bm.test(64) && bm.test(129));
        assert!(!bm.test(1) && !bm.test(63) && !bm.test(128));
        assert_eq!(bm.count_ones(), 3);

        bm.clear(64);
        assert!(!bm.test(64));
        assert_eq!(bm.count_ones(), 2);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut bm = AllocationBitmap::new(8);
        bm.set(3);
        bm.set(3);
        assert_eq!(bm.count_ones(), 1);
        bm.clear(3);
        bm.clear(3);
        assert_eq!(bm.count_ones(), 0);
    }

    #[test]
    fn test_last_set_in_range() {
        let mut bm = AllocationBitmap::new(16);
        bm.set(2);
        bm.set(5);
        assert_eq!(bm.last_set_in(0, 8), Some(5));
        assert_eq!(bm.last_set_in(0, 4), Some(2));
        assert_eq!(bm.last_set_in(6, 4), None);
    }

    #[test]
    fn test_iter_ones_crosses_words() {
        let mut bm = AllocationBitmap::new(200);
        for bit in [1, 63, 64, 150, 199] {
            bm.set(bit);
        }
        assert_eq!(bm.iter_ones().collect::<Vec<_>>(), vec![1, 63, 64, 150, 199]);
    }

    #[test]
    fn test_zero_length() {
        let bm = AllocationBitmap::new(0);
        assert!(bm.is_empty());
        assert_eq!(bm.count_ones(), 0);
        assert_eq!(bm.iter_ones().count(), 0);
    }
}
