//! Extent free-list pool with first-fit placement.
//!
//! [`FirstFitPool`] keeps free space as a list of [`Extent`]s sorted by
//! offset. Allocation carves from the front of the lowest extent that is
//! large enough; freeing reinserts in address order and merges with any
//! adjacent free neighbours, so a fully drained pool is always a single
//! extent again.

use resv_core::{BackingPool, Extent};
use smallvec::SmallVec;

use crate::error::PoolError;

/// Byte-granular first-fit allocator over `[0, capacity)`.
///
/// Free extents live inline for the common case of a handful of holes.
/// The list is kept sorted, non-overlapping, and fully coalesced: no two
/// entries are adjacent.
#[derive(Clone, Debug)]
pub struct FirstFitPool {
    capacity: u64,
    /// Free extents, ascending by offset, never empty-length, never adjacent.
    free: SmallVec<[Extent; 8]>,
    available: u64,
}

impl FirstFitPool {
    /// Create a pool whose whole range `[0, capacity)` is free.
    pub fn new(capacity: u64) -> Self {
        let mut free = SmallVec::new();
        if capacity > 0 {
            free.push(Extent::new(0, capacity));
        }
        Self {
            capacity,
            free,
            available: capacity,
        }
    }

    /// Reserve `size` bytes at the lowest free address that fits.
    pub fn alloc(&mut self, size: u64) -> Option<u64> {
        if size == 0 || size > self.available {
            return None;
        }
        let idx = self.free.iter().position(|e| e.len >= size)?;
        let extent = &mut self.free[idx];
        let offset = extent.offset;
        extent.offset += size;
        extent.len -= size;
        if extent.len == 0 {
            self.free.remove(idx);
        }
        self.available -= size;
        Some(offset)
    }

    /// Return `[offset, offset + size)` to the pool.
    ///
    /// Fails without modifying the pool if the range is empty, out of
    /// bounds, or overlaps space that is already free.
    pub fn try_free(&mut self, offset: u64, size: u64) -> Result<(), PoolError> {
        if size == 0 {
            return Err(PoolError::ZeroSize);
        }
        let end = match offset.checked_add(size) {
            Some(end) if end <= self.capacity => end,
            _ => {
                return Err(PoolError::OutOfBounds {
                    offset,
                    size,
                    capacity: self.capacity,
                })
            }
        };

        let idx = self.free.partition_point(|e| e.offset < offset);
        let prev_end = idx.checked_sub(1).map(|p| {
            let prev = self.free[p];
            prev.offset + prev.len
        });
        let next_start = self.free.get(idx).map(|next| next.offset);

        if prev_end.is_some_and(|pe| pe > offset) || next_start.is_some_and(|ns| ns < end) {
            return Err(PoolError::NotAllocated { offset, size });
        }

        let joins_prev = prev_end == Some(offset);
        let joins_next = next_start == Some(end);
        match (joins_prev, joins_next) {
            (true, true) => {
                let next_len = self.free[idx].len;
                self.free[idx - 1].len += size + next_len;
                self.free.remove(idx);
            }
            (true, false) => self.free[idx - 1].len += size,
            (false, true) => {
                let next = &mut self.free[idx];
                next.offset = offset;
                next.len += size;
            }
            (false, false) => self.free.insert(idx, Extent::new(offset, size)),
        }
        self.available += size;
        Ok(())
    }

    /// Total bytes managed by the pool.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently free, regardless of contiguity.
    pub fn available(&self) -> u64 {
        self.available
    }

    /// Length of the largest contiguous free run.
    ///
    /// When this is smaller than [`available`](Self::available) the pool
    /// is fragmented.
    pub fn largest_free(&self) -> u64 {
        self.free.iter().map(|e| e.len).max().unwrap_or(0)
    }

    /// Number of disjoint free runs.
    pub fn fragments(&self) -> usize {
        self.free.len()
    }

    /// The free extents in address order.
    pub fn free_extents(&self) -> &[Extent] {
        &self.free
    }
}

impl BackingPool for FirstFitPool {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        FirstFitPool::alloc(self, size)
    }

    fn free(&mut self, offset: u64, size: u64) {
        if let Err(e) = self.try_free(offset, size) {
            log::error!("first-fit pool: rejected free: {e}");
        }
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        self.try_free(offset, size).is_ok()
    }
}
