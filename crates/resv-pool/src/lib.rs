//! Address-ordered backing pools for resv zones.
//!
//! Two implementations of [`BackingPool`](resv_core::BackingPool), both
//! first-fit from the lowest address:
//!
//! - [`FirstFitPool`]: byte-granular free list of extents, coalesced on
//!   free. Memory use scales with fragmentation, not capacity.
//! - [`BitmapPool`]: one bit per `1 << min_alloc_order` bytes. Requests
//!   are rounded up to whole granules.
//!
//! Misuse of `free` (ranges never handed out, out of bounds, or already
//! free) is reported through `try_free`. The trait-level `free` cannot
//! return an error, so it logs the rejection and leaves the pool as it
//! was.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bitmap;
pub mod error;
pub mod first_fit;

pub use bitmap::BitmapPool;
pub use error::PoolError;
pub use first_fit::FirstFitPool;
