//! The two-ended zone allocator.
//!
//! [`Zone`] tracks two boundaries inside a fixed range: `head`, the first
//! byte not yet handed out from the low end, and `tail`, the first byte
//! handed out from the high end. Everything in `[head, tail)` is free and
//! `free == tail - head` holds after every call.
//!
//! The backing pool decides where blocks land. Head blocks land at the
//! lowest free address, which is `head` itself while frees come back in
//! order. Tail blocks are pushed to the top by first allocating a padding
//! block that covers `[head, tail - size)`, allocating the real block
//! (which the pool then has to place right after the padding), and
//! releasing the padding again.

use resv_core::{BackingPool, End};
use resv_pool::FirstFitPool;

use crate::config::{ConfigError, FreeCheck, ZoneConfig};
use crate::error::ZoneError;

/// Point-in-time view of a zone's boundaries and region counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneStats {
    /// Fixed extent of the zone.
    pub total: u64,
    /// Head boundary.
    pub head: u64,
    /// Tail boundary.
    pub tail: u64,
    /// Bytes in `[head, tail)`.
    pub free: u64,
    /// Live blocks allocated from the head.
    pub head_regions: u32,
    /// Live blocks allocated from the tail.
    pub tail_regions: u32,
}

/// A fixed byte range that allocates from both ends.
///
/// Not synchronised: wrap it in a [`SharedZone`](crate::SharedZone) or
/// hand it to a [`ZoneWorker`](crate::ZoneWorker) when several threads
/// need it. Each operation is a single critical section as far as the
/// pool is concerned.
pub struct Zone<P> {
    config: ZoneConfig,
    pool: P,
    head: u64,
    tail: u64,
    free: u64,
    head_regions: u32,
    tail_regions: u32,
}

impl Zone<FirstFitPool> {
    /// Create a zone backed by a fresh [`FirstFitPool`] covering it.
    pub fn with_first_fit(config: ZoneConfig) -> Result<Self, ConfigError> {
        let pool = FirstFitPool::new(config.size);
        Self::new(config, pool)
    }
}

impl<P: BackingPool> Zone<P> {
    /// Create an empty zone over `pool`.
    ///
    /// The pool must cover exactly `[0, config.size)` and have nothing
    /// allocated yet.
    pub fn new(config: ZoneConfig, pool: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            head: 0,
            tail: config.size,
            free: config.size,
            head_regions: 0,
            tail_regions: 0,
            config,
            pool,
        })
    }

    /// Allocate `size` bytes from the low end.
    ///
    /// Returns the offset chosen by the pool and advances the head
    /// boundary. Fails with [`ZoneError::OutOfMemory`] and no state change
    /// when the free span or the pool cannot hold the request.
    pub fn allocate_head(&mut self, size: u64) -> Result<u64, ZoneError> {
        let oom = self.out_of_memory(size);
        let size = match self.round(size) {
            Some(s) if s > 0 && s <= self.free => s,
            _ => return Err(oom),
        };
        let offset = self.place(size).ok_or(oom)?;

        self.head += size;
        self.free -= size;
        self.head_regions += 1;
        Ok(offset)
    }

    /// Allocate `size` bytes ending exactly at the tail boundary.
    ///
    /// Fails immediately, without touching the pool, when the free span
    /// is smaller than the request. If the pool then fails, any padding
    /// already taken is returned before the error is reported.
    pub fn allocate_tail(&mut self, size: u64) -> Result<u64, ZoneError> {
        let oom = self.out_of_memory(size);
        let size = match self.round(size) {
            Some(s) if s > 0 => s,
            _ => return Err(oom),
        };
        match self.head.checked_add(size) {
            Some(needed) if needed <= self.tail => {}
            _ => return Err(oom),
        }

        let reserve = self.tail - self.head - size;
        let offset = if reserve > 0 {
            let padding = self.pool.alloc(reserve).ok_or_else(|| oom.clone())?;
            let placed = self.place(size);
            self.pool.free(padding, reserve);
            placed.ok_or(oom)?
        } else {
            self.place(size).ok_or(oom)?
        };

        self.tail -= size;
        self.free -= size;
        self.tail_regions += 1;
        Ok(offset)
    }

    /// Return a head block of `size` bytes at `offset`.
    ///
    /// The block must lie below the head boundary (and, under
    /// [`FreeCheck::Strict`], end exactly at it) and still be allocated in
    /// the pool. Anything else is [`ZoneError::InvalidFreeOrder`] and
    /// leaves the zone unchanged.
    pub fn free_head(&mut self, offset: u64, size: u64) -> Result<(), ZoneError> {
        let invalid = ZoneError::InvalidFreeOrder {
            end: End::Head,
            offset,
            boundary: self.head,
        };
        if offset > self.head {
            return Err(invalid);
        }
        let size = match self.round(size) {
            Some(s) if s > 0 && s <= self.head => s,
            _ => return Err(invalid),
        };
        let block_end = match offset.checked_add(size) {
            Some(e) if e <= self.head => e,
            _ => return Err(invalid),
        };
        if self.config.free_check == FreeCheck::Strict && block_end != self.head {
            return Err(invalid);
        }

        if !self.pool.try_release(offset, size) {
            return Err(invalid);
        }
        self.head -= size;
        self.free += size;
        self.head_regions = self.head_regions.saturating_sub(1);
        Ok(())
    }

    /// Return a tail block of `size` bytes at `offset`.
    ///
    /// The block must start at or below the tail boundary (exactly at it
    /// under [`FreeCheck::Strict`]) and the boundary must have room to
    /// move up by `size`, and the pool must still hold the block. Anything
    /// else is [`ZoneError::InvalidFreeOrder`] and leaves the zone unchanged.
    pub fn free_tail(&mut self, offset: u64, size: u64) -> Result<(), ZoneError> {
        let invalid = ZoneError::InvalidFreeOrder {
            end: End::Tail,
            offset,
            boundary: self.tail,
        };
        if offset > self.tail {
            return Err(invalid);
        }
        if self.config.free_check == FreeCheck::Strict && offset != self.tail {
            return Err(invalid);
        }
        let size = match self.round(size) {
            Some(s) if s > 0 => s,
            _ => return Err(invalid),
        };
        let total = self.config.size;
        let in_zone = |e: Option<u64>| e.is_some_and(|e| e <= total);
        if !in_zone(self.tail.checked_add(size)) || !in_zone(offset.checked_add(size)) {
            return Err(invalid);
        }

        if !self.pool.try_release(offset, size) {
            return Err(invalid);
        }
        self.tail += size;
        self.free += size;
        self.tail_regions = self.tail_regions.saturating_sub(1);
        Ok(())
    }

    /// Allocate from the given end.
    pub fn allocate(&mut self, end: End, size: u64) -> Result<u64, ZoneError> {
        match end {
            End::Head => self.allocate_head(size),
            End::Tail => self.allocate_tail(size),
        }
    }

    /// Free at the given end.
    pub fn release(&mut self, end: End, offset: u64, size: u64) -> Result<(), ZoneError> {
        match end {
            End::Head => self.free_head(offset, size),
            End::Tail => self.free_tail(offset, size),
        }
    }

    /// Pool allocation that must land inside the zone. A block placed
    /// past the zone end goes straight back to the pool.
    fn place(&mut self, size: u64) -> Option<u64> {
        let offset = self.pool.alloc(size)?;
        if offset.checked_add(size).is_some_and(|end| end <= self.config.size) {
            return Some(offset);
        }
        self.pool.free(offset, size);
        None
    }

    fn out_of_memory(&self, requested: u64) -> ZoneError {
        ZoneError::OutOfMemory {
            requested,
            free: self.free,
        }
    }

    fn round(&self, size: u64) -> Option<u64> {
        size.checked_next_multiple_of(self.config.granule)
    }
}

impl<P> Zone<P> {
    /// Head boundary: offset of the next free byte at the low end.
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Tail boundary: one past the next free byte at the high end.
    pub fn tail(&self) -> u64 {
        self.tail
    }

    /// Bytes between the boundaries.
    pub fn free(&self) -> u64 {
        self.free
    }

    /// Fixed extent of the zone.
    pub fn total_size(&self) -> u64 {
        self.config.size
    }

    /// Zone name from its config.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The validated configuration.
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Translate a zone offset to an absolute address.
    ///
    /// # Panics
    ///
    /// Panics if `offset` exceeds the zone size.
    pub fn address_of(&self, offset: u64) -> u64 {
        assert!(
            offset <= self.config.size,
            "offset {offset:#x} outside zone '{}'",
            self.config.name
        );
        // validate() guarantees base + size does not wrap.
        self.config.base + offset
    }

    /// Snapshot of boundaries and live region counts.
    pub fn stats(&self) -> ZoneStats {
        ZoneStats {
            total: self.config.size,
            head: self.head,
            tail: self.tail,
            free: self.free,
            head_regions: self.head_regions,
            tail_regions: self.tail_regions,
        }
    }

    /// Read access to the backing pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Tear the zone down, handing back its pool.
    pub fn into_pool(self) -> P {
        self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resv_test_utils::{FailingPool, PoolCall, RecordingPool, ScatterPool};

    fn zone(size: u64) -> Zone<FirstFitPool> {
        Zone::with_first_fit(ZoneConfig::new("test", size)).unwrap()
    }

    fn strict_zone(size: u64) -> Zone<FirstFitPool> {
        let mut config = ZoneConfig::new("strict", size);
        config.free_check = FreeCheck::Strict;
        Zone::with_first_fit(config).unwrap()
    }

    fn assert_consistent<P>(z: &Zone<P>) {
        assert!(z.head() <= z.tail());
        assert!(z.tail() <= z.total_size());
        assert_eq!(z.free(), z.tail() - z.head());
    }

    #[test]
    fn new_zone_is_empty() {
        let z = zone(1000);
        assert_eq!(z.head(), 0);
        assert_eq!(z.tail(), 1000);
        assert_eq!(z.free(), 1000);
        assert_eq!(z.name(), "test");
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(matches!(
            Zone::with_first_fit(ZoneConfig::new("z", 0)),
            Err(ConfigError::EmptyZone)
        ));
    }

    #[test]
    fn head_allocations_are_sequential() {
        let mut z = zone(1000);
        assert_eq!(z.allocate_head(100), Ok(0));
        assert_eq!(z.allocate_head(50), Ok(100));
        assert_eq!(z.head(), 150);
        assert_eq!(z.free(), 850);
        assert_consistent(&z);
    }

    #[test]
    fn tail_allocations_grow_down() {
        let mut z = zone(1000);
        assert_eq!(z.allocate_tail(200), Ok(800));
        assert_eq!(z.allocate_tail(100), Ok(700));
        assert_eq!(z.tail(), 700);
        assert_eq!(z.free(), 700);
        assert_consistent(&z);
    }

    #[test]
    fn tail_padding_is_returned_to_pool() {
        let mut z = Zone::new(ZoneConfig::new("rec", 1000), RecordingPool::first_fit(1000)).unwrap();
        z.allocate_head(100).unwrap();
        let offset = z.allocate_tail(200).unwrap();
        assert_eq!(offset, 800);
        assert_eq!(
            &z.pool().calls()[1..],
            &[
                PoolCall::Alloc {
                    size: 700,
                    result: Some(100)
                },
                PoolCall::Alloc {
                    size: 200,
                    result: Some(800)
                },
                PoolCall::Free {
                    offset: 100,
                    size: 700
                },
            ]
        );
        assert_eq!(z.pool().inner().available(), 700);
    }

    #[test]
    fn tail_without_reserve_skips_padding() {
        let mut z = Zone::new(ZoneConfig::new("rec", 300), RecordingPool::first_fit(300)).unwrap();
        z.allocate_head(100).unwrap();
        assert_eq!(z.allocate_tail(200), Ok(100));
        assert_eq!(z.pool().alloc_count(), 2);
        assert_eq!(z.free(), 0);
    }

    #[test]
    fn oversized_tail_fails_without_pool_call() {
        let mut z = Zone::new(ZoneConfig::new("rec", 500), RecordingPool::first_fit(500)).unwrap();
        assert!(matches!(
            z.allocate_tail(600),
            Err(ZoneError::OutOfMemory { requested: 600, free: 500 })
        ));
        assert!(z.pool().calls().is_empty());
        assert_eq!(z.tail(), 500);
    }

    #[test]
    fn tail_second_alloc_failure_frees_padding() {
        let pool = FailingPool::new(FirstFitPool::new(1000), 1);
        let mut z = Zone::new(ZoneConfig::new("fail", 1000), pool).unwrap();
        assert!(matches!(
            z.allocate_tail(100),
            Err(ZoneError::OutOfMemory { .. })
        ));
        assert_eq!(z.tail(), 1000);
        assert_eq!(z.free(), 1000);
        assert_eq!(z.pool().inner().available(), 1000);
    }

    #[test]
    fn head_pool_failure_leaves_state() {
        let pool = FailingPool::new(FirstFitPool::new(100), 0);
        let mut z = Zone::new(ZoneConfig::new("fail", 100), pool).unwrap();
        assert!(z.allocate_head(10).is_err());
        assert_eq!(z.head(), 0);
        assert_eq!(z.stats().head_regions, 0);
    }

    #[test]
    fn zero_size_requests_fail() {
        let mut z = zone(100);
        assert!(matches!(
            z.allocate_head(0),
            Err(ZoneError::OutOfMemory { .. })
        ));
        assert!(matches!(
            z.allocate_tail(0),
            Err(ZoneError::OutOfMemory { .. })
        ));
        assert!(matches!(
            z.free_head(0, 0),
            Err(ZoneError::InvalidFreeOrder { .. })
        ));
    }

    #[test]
    fn huge_tail_request_does_not_wrap() {
        let mut z = zone(100);
        z.allocate_head(10).unwrap();
        assert!(matches!(
            z.allocate_tail(u64::MAX),
            Err(ZoneError::OutOfMemory { .. })
        ));
        assert_consistent(&z);
    }

    #[test]
    fn free_head_beyond_boundary_rejected() {
        let mut z = zone(1000);
        z.allocate_head(100).unwrap();
        let err = z.free_head(150, 10).unwrap_err();
        assert_eq!(
            err,
            ZoneError::InvalidFreeOrder {
                end: End::Head,
                offset: 150,
                boundary: 100
            }
        );
        assert_eq!(z.head(), 100);
    }

    #[test]
    fn free_head_larger_than_head_rejected() {
        let mut z = zone(1000);
        z.allocate_head(100).unwrap();
        assert!(z.free_head(0, 200).is_err());
        assert!(z.free_head(50, 100).is_err());
        assert_eq!(z.free(), 900);
    }

    #[test]
    fn boundary_check_accepts_older_head_block() {
        let mut z = zone(1000);
        let a = z.allocate_head(100).unwrap();
        let _b = z.allocate_head(100).unwrap();
        assert_eq!(z.free_head(a, 100), Ok(()));
        assert_eq!(z.head(), 100);
        assert_consistent(&z);
    }

    #[test]
    fn double_free_of_older_head_block_rejected() {
        let mut z = zone(1000);
        let a = z.allocate_head(100).unwrap();
        let _b = z.allocate_head(100).unwrap();
        z.free_head(a, 100).unwrap();
        assert_eq!(
            z.free_head(a, 100),
            Err(ZoneError::InvalidFreeOrder {
                end: End::Head,
                offset: a,
                boundary: 100
            })
        );
        assert_eq!(z.head(), 100);
        assert_eq!(z.free(), 900);
        assert_eq!(z.pool().available(), 900);
        assert_consistent(&z);
    }

    #[test]
    fn tail_free_inside_free_space_rejected() {
        let mut z = zone(1000);
        z.allocate_tail(100).unwrap();
        assert!(matches!(
            z.free_tail(850, 50),
            Err(ZoneError::InvalidFreeOrder { end: End::Tail, .. })
        ));
        assert_eq!(z.tail(), 900);
        assert_eq!(z.stats().tail_regions, 1);
        assert_eq!(z.pool().available(), z.free());
    }

    #[test]
    fn strict_check_requires_most_recent_head_block() {
        let mut z = strict_zone(1000);
        let a = z.allocate_head(100).unwrap();
        let b = z.allocate_head(100).unwrap();
        assert!(matches!(
            z.free_head(a, 100),
            Err(ZoneError::InvalidFreeOrder { .. })
        ));
        z.free_head(b, 100).unwrap();
        z.free_head(a, 100).unwrap();
        assert_eq!(z.head(), 0);
    }

    #[test]
    fn older_tail_block_freed_first_is_rejected() {
        let mut z = zone(1000);
        let older = z.allocate_tail(200).unwrap();
        let newer = z.allocate_tail(100).unwrap();
        assert_eq!(
            z.free_tail(older, 200),
            Err(ZoneError::InvalidFreeOrder {
                end: End::Tail,
                offset: 800,
                boundary: 700
            })
        );
        z.free_tail(newer, 100).unwrap();
        z.free_tail(older, 200).unwrap();
        assert_eq!(z.tail(), 1000);
        assert_eq!(z.free(), 1000);
    }

    #[test]
    fn free_tail_past_zone_end_rejected() {
        let mut z = zone(1000);
        let t = z.allocate_tail(100).unwrap();
        assert!(z.free_tail(t, 200).is_err());
        assert_eq!(z.tail(), 900);
    }

    #[test]
    fn strict_tail_requires_exact_boundary() {
        let mut z = strict_zone(1000);
        z.allocate_tail(100).unwrap();
        assert!(z.free_tail(850, 50).is_err());
        assert_eq!(z.free_tail(900, 100), Ok(()));
    }

    #[test]
    fn both_ends_meet_exactly() {
        let mut z = zone(1000);
        z.allocate_head(400).unwrap();
        assert_eq!(z.allocate_tail(600), Ok(400));
        assert_eq!(z.free(), 0);
        assert!(z.allocate_head(1).is_err());
        assert!(z.allocate_tail(1).is_err());
    }

    #[test]
    fn granule_rounds_requests() {
        let mut config = ZoneConfig::new("g", 1024);
        config.granule = 64;
        let mut z = Zone::with_first_fit(config).unwrap();
        assert_eq!(z.allocate_head(1), Ok(0));
        assert_eq!(z.head(), 64);
        assert_eq!(z.allocate_tail(65), Ok(896));
        assert_eq!(z.tail(), 896);
        z.free_tail(896, 65).unwrap();
        z.free_head(0, 1).unwrap();
        assert_eq!(z.free(), 1024);
    }

    #[test]
    fn dispatch_by_end() {
        let mut z = zone(100);
        let h = z.allocate(End::Head, 10).unwrap();
        let t = z.allocate(End::Tail, 10).unwrap();
        assert_eq!((h, t), (0, 90));
        z.release(End::Tail, t, 10).unwrap();
        z.release(End::Head, h, 10).unwrap();
        assert_eq!(z.free(), 100);
    }

    #[test]
    fn stats_track_regions() {
        let mut z = zone(1000);
        z.allocate_head(10).unwrap();
        z.allocate_head(10).unwrap();
        z.allocate_tail(10).unwrap();
        let stats = z.stats();
        assert_eq!(stats.head_regions, 2);
        assert_eq!(stats.tail_regions, 1);
        assert_eq!(stats.free, 970);
    }

    #[test]
    fn address_translation_adds_base() {
        let mut config = ZoneConfig::new("ocm", 0x1000);
        config.base = 0xfec0_0000;
        let z = Zone::with_first_fit(config).unwrap();
        assert_eq!(z.address_of(0x200), 0xfec0_0200);
    }

    #[test]
    #[should_panic(expected = "outside zone")]
    fn address_translation_rejects_foreign_offset() {
        let z = zone(0x100);
        z.address_of(0x101);
    }

    #[test]
    fn non_first_fit_pool_keeps_accounting_consistent() {
        let mut z = Zone::new(ZoneConfig::new("scatter", 100), ScatterPool::new(100)).unwrap();
        let h = z.allocate_head(10).unwrap();
        assert_eq!(h, 90);
        assert_consistent(&z);
        assert!(z.free_head(h, 10).is_err());
        assert_consistent(&z);
    }

    #[test]
    fn pool_placement_past_zone_end_is_refused() {
        let mut z = Zone::new(ZoneConfig::new("small", 100), ScatterPool::new(1000)).unwrap();
        assert!(matches!(
            z.allocate_head(10),
            Err(ZoneError::OutOfMemory { requested: 10, .. })
        ));
        assert!(matches!(
            z.allocate_tail(10),
            Err(ZoneError::OutOfMemory { .. })
        ));
        assert_eq!(z.pool().available(), 1000);
        assert_eq!(z.stats().head_regions, 0);
        assert_consistent(&z);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Head(u64),
            Tail(u64),
            FreeHead,
            FreeTail,
            BadFreeHead(u64),
            BadFreeTail(u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1u64..300).prop_map(Op::Head),
                (1u64..300).prop_map(Op::Tail),
                Just(Op::FreeHead),
                Just(Op::FreeTail),
                (1u64..100).prop_map(Op::BadFreeHead),
                (1u64..100).prop_map(Op::BadFreeTail),
            ]
        }

        proptest! {
            #[test]
            fn invariants_hold_over_any_sequence(ops in proptest::collection::vec(op(), 1..60)) {
                let mut z = zone(1000);
                let mut heads: Vec<(u64, u64)> = Vec::new();
                let mut tails: Vec<(u64, u64)> = Vec::new();
                for op in ops {
                    let before = z.stats();
                    match op {
                        Op::Head(size) => match z.allocate_head(size) {
                            Ok(off) => heads.push((off, size)),
                            Err(_) => prop_assert_eq!(z.stats(), before),
                        },
                        Op::Tail(size) => match z.allocate_tail(size) {
                            Ok(off) => {
                                prop_assert_eq!(off, before.tail - size);
                                tails.push((off, size));
                            }
                            Err(_) => prop_assert_eq!(z.stats(), before),
                        },
                        Op::FreeHead => {
                            if let Some((off, size)) = heads.pop() {
                                prop_assert!(z.free_head(off, size).is_ok());
                            }
                        }
                        Op::FreeTail => {
                            if let Some((off, size)) = tails.pop() {
                                prop_assert!(z.free_tail(off, size).is_ok());
                            }
                        }
                        Op::BadFreeHead(delta) => {
                            let r = z.free_head(before.head + delta, 1);
                            let is_order_err = matches!(r, Err(ZoneError::InvalidFreeOrder { .. }));
                            prop_assert!(is_order_err);
                            prop_assert_eq!(z.stats(), before);
                        }
                        Op::BadFreeTail(delta) => {
                            let r = z.free_tail(before.tail + delta, 1);
                            let is_order_err = matches!(r, Err(ZoneError::InvalidFreeOrder { .. }));
                            prop_assert!(is_order_err);
                            prop_assert_eq!(z.stats(), before);
                        }
                    }
                    prop_assert!(z.head() <= z.tail());
                    prop_assert!(z.tail() <= z.total_size());
                    prop_assert_eq!(z.free(), z.tail() - z.head());
                    prop_assert_eq!(z.pool().available(), z.free());
                }
            }

            #[test]
            fn head_alloc_then_free_restores_state(
                prefix in proptest::collection::vec(1u64..100, 0..5),
                size in 1u64..500,
            ) {
                let mut z = zone(1000);
                for p in prefix {
                    let _ = z.allocate_head(p);
                }
                let before = z.stats();
                if let Ok(off) = z.allocate_head(size) {
                    z.free_head(off, size).unwrap();
                    prop_assert_eq!(z.head(), before.head);
                    prop_assert_eq!(z.free(), before.free);
                }
            }

            #[test]
            fn tail_alloc_then_free_restores_state(
                head in 0u64..400,
                size in 1u64..700,
            ) {
                let mut z = zone(1000);
                if head > 0 {
                    z.allocate_head(head).unwrap();
                }
                let before = z.stats();
                if let Ok(off) = z.allocate_tail(size) {
                    z.free_tail(off, size).unwrap();
                    prop_assert_eq!(z.tail(), before.tail);
                    prop_assert_eq!(z.free(), before.free);
                    prop_assert_eq!(z.pool().available(), before.free);
                }
            }

            #[test]
            fn oversized_requests_always_fail(
                head in 0u64..500,
                excess in 1u64..1000,
                from_tail in any::<bool>(),
            ) {
                let mut z = zone(1000);
                if head > 0 {
                    z.allocate_head(head).unwrap();
                }
                let before = z.stats();
                let size = before.free + excess;
                let r = if from_tail { z.allocate_tail(size) } else { z.allocate_head(size) };
                let is_oom = matches!(r, Err(ZoneError::OutOfMemory { .. }));
                prop_assert!(is_oom);
                prop_assert_eq!(z.stats(), before);
            }
        }
    }
}
