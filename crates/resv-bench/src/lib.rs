//! Benchmark workloads for the resv allocators.
//!
//! - [`fill_and_drain`]: alternate head and tail allocations until the
//!   zone is full, then unwind both ends newest-first.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use resv_core::{BackingPool, End};
use resv_pool::FirstFitPool;
use resv_zone::{Zone, ZoneConfig};

/// A first-fit zone of `size` bytes for benchmarking.
pub fn bench_zone(size: u64) -> Zone<FirstFitPool> {
    Zone::with_first_fit(ZoneConfig::new("bench", size))
        .expect("benchmark zone size must be non-zero")
}

/// Fill `zone` with `block`-byte allocations from alternating ends, then
/// free them all. Returns the number of blocks placed.
pub fn fill_and_drain<P: BackingPool>(zone: &mut Zone<P>, block: u64) -> usize {
    let mut live = Vec::new();
    let mut end = End::Head;
    while let Ok(offset) = zone.allocate(end, block) {
        live.push((end, offset));
        end = match end {
            End::Head => End::Tail,
            End::Tail => End::Head,
        };
    }
    let placed = live.len();
    while let Some((end, offset)) = live.pop() {
        // Newest-first per end is always a valid order.
        let _ = zone.release(end, offset, block);
    }
    placed
}
