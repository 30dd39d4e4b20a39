//! resv: resource-reservation allocators.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all resv sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use resv::prelude::*;
//!
//! let mut zone = Zone::with_first_fit(ZoneConfig::new("ocmem", 1000)).unwrap();
//! assert_eq!(zone.allocate_head(100), Ok(0));
//! assert_eq!(zone.allocate_tail(200), Ok(800));
//! assert_eq!(zone.free(), 700);
//!
//! // A free must lie on the allocated side of its end's boundary.
//! zone.free_tail(800, 200).unwrap();
//! assert!(zone.free_head(150, 10).is_err());
//! zone.free_head(0, 100).unwrap();
//! assert_eq!(zone.free(), 1000);
//!
//! let dma = DmaChannels::default();
//! dma.request(1, "floppy").unwrap();
//! assert_eq!(dma.to_string(), " 1: floppy\n 4: cascade\n");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `resv-core` | Extents, ends, owner IDs, the `BackingPool` trait |
//! | [`pool`] | `resv-pool` | First-fit and bitmap backing pools |
//! | [`zone`] | `resv-zone` | Zones, shared handles, registry, worker thread |
//! | [`dma`] | `resv-dma` | DMA channel claim table |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the backing-pool trait (`resv-core`).
pub use resv_core as types;

/// Backing pools (`resv-pool`).
///
/// [`pool::FirstFitPool`] for byte-granular free lists,
/// [`pool::BitmapPool`] for fixed-granule bitmaps.
pub use resv_pool as pool;

/// Two-ended zones and their embedding layers (`resv-zone`).
pub use resv_zone as zone;

/// Legacy DMA channel claims (`resv-dma`).
pub use resv_dma as dma;

/// Common imports for typical resv usage.
pub mod prelude {
    pub use resv_core::{BackingPool, End, Extent, OwnerId};
    pub use resv_dma::{ChannelGuard, DmaChannels, DmaConfig, DmaError};
    pub use resv_pool::{BitmapPool, FirstFitPool, PoolError};
    pub use resv_zone::{
        Allocation, FreeCheck, SharedZone, ViolationPolicy, Zone, ZoneConfig, ZoneError,
        ZonePolicy, ZoneRegistry, ZoneStats, ZoneWorker,
    };
}
