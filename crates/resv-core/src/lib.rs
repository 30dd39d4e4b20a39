//! Core types and traits for the resv reservation allocators.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: byte
//! extents, the two ends of a zone, owner identifiers, and the
//! [`BackingPool`] capability that zones delegate placement to.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod pool;

pub use id::{End, Extent, OwnerId};
pub use pool::BackingPool;
