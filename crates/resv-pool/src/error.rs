//! Pool error types.

use std::error::Error;
use std::fmt;

/// Errors reported by pool construction and `try_free`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// A zero-byte range was passed where a real range is required.
    ZeroSize,
    /// The range does not lie inside the pool.
    OutOfBounds {
        /// Start of the offending range.
        offset: u64,
        /// Length of the offending range.
        size: u64,
        /// Pool capacity in bytes.
        capacity: u64,
    },
    /// Part of the range is already free (double free or never allocated).
    NotAllocated {
        /// Start of the offending range.
        offset: u64,
        /// Length of the offending range.
        size: u64,
    },
    /// A value that must be a multiple of the pool granule is not.
    Misaligned {
        /// The misaligned value.
        value: u64,
        /// The granule it must be a multiple of.
        granule: u64,
    },
    /// `min_alloc_order` does not describe a representable granule.
    BadOrder {
        /// The rejected order.
        order: u32,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "zero-sized range"),
            Self::OutOfBounds {
                offset,
                size,
                capacity,
            } => {
                write!(
                    f,
                    "range of {size} bytes at {offset:#x} exceeds pool capacity {capacity}"
                )
            }
            Self::NotAllocated { offset, size } => {
                write!(f, "range of {size} bytes at {offset:#x} is not allocated")
            }
            Self::Misaligned { value, granule } => {
                write!(f, "{value:#x} is not a multiple of granule {granule}")
            }
            Self::BadOrder { order } => {
                write!(f, "min_alloc_order {order} is out of range")
            }
        }
    }
}

impl Error for PoolError {}
