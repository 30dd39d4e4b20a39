//! The backing-pool capability that zones place their blocks through.

/// An address-ordered allocator over a fixed range of offsets.
///
/// Zones never decide where a block lands; they ask a pool. The
/// tail-allocation path in `resv-zone` relies on the pool placing every
/// request at the lowest free address that fits (first-fit from the low
/// end). Pools that break this still produce valid, non-overlapping
/// allocations, but tail blocks will not sit flush against the tail.
pub trait BackingPool {
    /// Reserve `size` bytes and return the offset of the first byte.
    ///
    /// Returns `None` when no contiguous free run of `size` bytes exists.
    fn alloc(&mut self, size: u64) -> Option<u64>;

    /// Return `[offset, offset + size)` to the pool.
    ///
    /// The range must have been handed out by [`alloc`](Self::alloc)
    /// (possibly as part of a larger block that has since been split by
    /// the caller's bookkeeping).
    fn free(&mut self, offset: u64, size: u64);

    /// Return `[offset, offset + size)` only if it is currently allocated.
    ///
    /// Returns `false` and leaves the pool untouched when the range is
    /// out of bounds or overlaps free space. Zones release through this
    /// so a double free never reaches their boundary accounting. The
    /// default forwards to [`free`](Self::free) and accepts every range.
    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        self.free(offset, size);
        true
    }
}

impl<P: BackingPool + ?Sized> BackingPool for &mut P {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        (**self).alloc(size)
    }

    fn free(&mut self, offset: u64, size: u64) {
        (**self).free(offset, size)
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        (**self).try_release(offset, size)
    }
}

impl<P: BackingPool + ?Sized> BackingPool for Box<P> {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        (**self).alloc(size)
    }

    fn free(&mut self, offset: u64, size: u64) {
        (**self).free(offset, size)
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        (**self).try_release(offset, size)
    }
}
