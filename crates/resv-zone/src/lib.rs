//! Two-ended zone allocation.
//!
//! A [`Zone`] manages a fixed byte range `[0, total_size)`. Blocks are
//! taken from the low end ("head", growing up) or the high end ("tail",
//! growing down); the gap between the two boundaries is the free span.
//! Placement is delegated to an injected [`BackingPool`](resv_core::BackingPool).
//!
//! ```text
//!  0          head                      tail          total_size
//!  |==========|..........free...........|=============|
//!   head blocks                          tail blocks
//! ```
//!
//! Frees must come back in reverse allocation order per end. A free that
//! would leave a hole behind a still-live block is refused with
//! [`ZoneError::InvalidFreeOrder`] and changes nothing.
//!
//! `Zone` performs no locking and no logging. The embedding layers add
//! those:
//!
//! - [`SharedZone`]: `Arc<Mutex<_>>` with a [`ViolationPolicy`] deciding
//!   whether a misordered free quarantines the zone.
//! - [`ZoneRegistry`]: one zone per [`OwnerId`](resv_core::OwnerId), each
//!   with a preferred end and an optional live-region limit.
//! - [`ZoneWorker`]: moves a zone onto its own thread and serialises
//!   access through a channel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod registry;
pub mod shared;
pub mod worker;
pub mod zone;

// Public re-exports for the primary API surface.
pub use config::{ConfigError, FreeCheck, ZoneConfig};
pub use error::ZoneError;
pub use registry::{Allocation, RegistryError, ZonePolicy, ZoneRegistry};
pub use shared::{SharedZone, ViolationPolicy};
pub use worker::{WorkerError, ZoneWorker};
pub use zone::{Zone, ZoneStats};
