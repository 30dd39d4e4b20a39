//! Test utilities and mock pools for resv development.
//!
//! Wrappers around any [`BackingPool`] that record or sabotage calls,
//! plus a deliberately non-first-fit pool for exercising placement
//! assumptions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use resv_core::BackingPool;
use resv_pool::FirstFitPool;

/// One call observed by a [`RecordingPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolCall {
    Alloc { size: u64, result: Option<u64> },
    Free { offset: u64, size: u64 },
}

/// Forwards to an inner pool and records every call in order.
pub struct RecordingPool<P> {
    inner: P,
    calls: Vec<PoolCall>,
}

impl<P: BackingPool> RecordingPool<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[PoolCall] {
        &self.calls
    }

    pub fn alloc_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PoolCall::Alloc { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl RecordingPool<FirstFitPool> {
    /// Recording wrapper around a fresh first-fit pool of `capacity` bytes.
    pub fn first_fit(capacity: u64) -> Self {
        Self::new(FirstFitPool::new(capacity))
    }
}

impl<P: BackingPool> BackingPool for RecordingPool<P> {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        let result = self.inner.alloc(size);
        self.calls.push(PoolCall::Alloc { size, result });
        result
    }

    fn free(&mut self, offset: u64, size: u64) {
        self.calls.push(PoolCall::Free { offset, size });
        self.inner.free(offset, size);
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        self.calls.push(PoolCall::Free { offset, size });
        self.inner.try_release(offset, size)
    }
}

/// Lets the first `successes` allocations through, then fails every
/// later one. Frees always reach the inner pool.
pub struct FailingPool<P> {
    inner: P,
    remaining: usize,
}

impl<P: BackingPool> FailingPool<P> {
    pub fn new(inner: P, successes: usize) -> Self {
        Self {
            inner,
            remaining: successes,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: BackingPool> BackingPool for FailingPool<P> {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.inner.alloc(size);
        if result.is_some() {
            self.remaining -= 1;
        }
        result
    }

    fn free(&mut self, offset: u64, size: u64) {
        self.inner.free(offset, size);
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        self.inner.try_release(offset, size)
    }
}

/// Places each request at the highest free address that fits.
///
/// Violates the first-fit placement that tail allocation relies on;
/// useful for checking that zones stay consistent with such pools.
pub struct ScatterPool {
    used: Vec<bool>,
}

impl ScatterPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
        }
    }

    pub fn available(&self) -> usize {
        self.used.iter().filter(|u| !**u).count()
    }
}

impl BackingPool for ScatterPool {
    fn alloc(&mut self, size: u64) -> Option<u64> {
        let size = usize::try_from(size).ok()?;
        if size == 0 || size > self.used.len() {
            return None;
        }
        let start = (0..=self.used.len() - size)
            .rev()
            .find(|&s| self.used[s..s + size].iter().all(|u| !*u))?;
        self.used[start..start + size].fill(true);
        Some(start as u64)
    }

    fn free(&mut self, offset: u64, size: u64) {
        let start = offset as usize;
        let end = (start + size as usize).min(self.used.len());
        if start < end {
            self.used[start..end].fill(false);
        }
    }

    fn try_release(&mut self, offset: u64, size: u64) -> bool {
        let (Ok(start), Ok(len)) = (usize::try_from(offset), usize::try_from(size)) else {
            return false;
        };
        let Some(end) = start.checked_add(len) else {
            return false;
        };
        if len == 0 || end > self.used.len() || !self.used[start..end].iter().all(|u| *u) {
            return false;
        }
        self.used[start..end].fill(false);
        true
    }
}
