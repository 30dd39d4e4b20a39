//! Granule bitmap pool.
//!
//! [`BitmapPool`] divides its range into granules of `1 << min_alloc_order`
//! bytes and tracks each with one bit. Requests are rounded up to whole
//! granules and placed at the lowest run of clear bits.

use resv_core::BackingPool;

use crate::error::PoolError;

const WORD_BITS: usize = u64::BITS as usize;

/// First-fit bitmap allocator over `[0, capacity)`.
#[derive(Clone, Debug)]
pub struct BitmapPool {
    capacity: u64,
    order: u32,
    granules: usize,
    /// Bit `i` set means granule `i` is allocated.
    bits: Vec<u64>,
    used_granules: usize,
}

impl BitmapPool {
    /// Create a pool of `capacity` bytes with `1 << min_alloc_order` granules.
    ///
    /// `capacity` must be a whole number of granules.
    pub fn new(capacity: u64, min_alloc_order: u32) -> Result<Self, PoolError> {
        if min_alloc_order >= u64::BITS {
            return Err(PoolError::BadOrder {
                order: min_alloc_order,
            });
        }
        let granule = 1u64 << min_alloc_order;
        if capacity % granule != 0 {
            return Err(PoolError::Misaligned {
                value: capacity,
                granule,
            });
        }
        let granules = usize::try_from(capacity >> min_alloc_order).map_err(|_| {
            PoolError::OutOfBounds {
                offset: 0,
                size: capacity,
                capacity: usize::MAX as u64,
            }
        })?;
        Ok(Self {
            capacity,
            order: min_alloc_order,
            granules,
            bits: vec![0; granules.div_ceil(WORD_BITS)],
            used_granules: 0,
        })
    }

    /// Size of one granule in bytes.
    pub fn granule(&self) -> u64 {
        1 << self.order
    }

    /// Reserve `size` bytes (rounded up to granules) at the lowest free run.
    pub fn alloc(&mut self, size: u64) -> Option<u64> {
        let needed = self.granules_for(size)?;
        if needed == 0 || needed > self.granules - self.used_granules {
            return None;
        }
        let mut run_start = 0;
        let mut run_len = 0;
        for i in 0..self.granules {
            if self.test(i) {
                run_start = i + 1;
                run_len = 0;
                continue;
            }
            run_len += 1;
            if run_len == needed {
                self.set_range(run_start, needed, true);
                self.used_granules += needed;
                return Some((run_start as u64) << self.order);
            }
        }
        None
    }

    /// Return `[offset, offset + size)` (rounded up to granules) to the pool.
    ///
    /// Every covered granule must currently be allocated.
    pub fn try_free(&mut self, offset: u64, size: u64) -> Result<(), PoolError> {
        if size == 0 {
            return Err(PoolError::ZeroSize);
        }
        let granule = self.granule();
        if offset % granule != 0 {
            return Err(PoolError::Misaligned {
                value: offset,
                granule,
            });
        }
        let out_of_bounds = PoolError::OutOfBounds {
            offset,
            size,
            capacity: self.capacity,
        };
        let rounded = match size.checked_next_multiple_of(granule) {
            Some(r) if offset.checked_add(r).is_some_and(|end| end <= self.capacity) => r,
            _ => return Err(out_of_bounds),
        };
        // In bounds, so both fit in usize.
        let start = (offset >> self.order) as usize;
        let count = (rounded >> self.order) as usize;
        if (start..start + count).any(|i| !self.test(i)) {
            return Err(PoolError::NotAllocated { offset, size });
        }
        self.set_range(start, count, false);
        self.used_granules -= count;
        Ok(())
    }

    /// Total bytes managed by the pool.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently free, regardless of contiguity.
    pub fn available(&self) -> u64 {
        ((self.granules - self.used_granules) as u64) << self.order
    }

    /// Length in bytes of the largest contiguous free run.
    pub fn largest_free(&self) -> u64 {
        self.free_runs().map(|(_, len)| len).max().unwrap_or(0) << self.order
    }

    /// Number of disjoint free runs.
    pub fn fragments(&self) -> usize {
        self.free_runs().count()
    }

    fn granules_for(&self, size: u64) -> Option<usize> {
        usize::try_from(size.div_ceil(self.granule())).ok()
    }

    fn test(&self, i: usize) -> bool {
        self.bits[i / WORD_BITS] & (1 << (i % WORD_BITS)) != 0
    }

    fn set_range(&mut self, start: usize, count: usize, value: bool) {
        for i in start..start + count {
            let mask = 1u64 << (i % WORD_BITS);
            if value {
                self.bits[i / WORD_BITS] |= mask;
            } else {
                self.bits[i / WORD_BITS] &= !mask;
            }
        }
    }

    /// `(start_granule, len_granules)` of each clear run, ascending.
    fn free_runs(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        let mut i = 0;
        std::iter::from_fn(move || {
            while i < self.granules && self.test(i) {
                i += 1;
            }
            if i >= self.granules {
                return None;
            }
            let start = i;
            while i < self.granules && !self.test(i) {
                i += 1;
            }
            Some((start, (i - start) as u64))
        })
    }
}

impl BackingPool for BitmapPool {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        BitmapPool::alloc(self, size)
    }

    fn free(&mut self, offset: u64, size: u64) {
        if let Err(e) = self.try_free(offset, size) {
            log::error!("bitmap pool: rejected free: {e}");
        }
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        self.try_free(offset, size).is_ok()
    }
}
