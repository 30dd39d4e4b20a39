//! Zone error types.

use std::error::Error;
use std::fmt;

use resv_core::End;

/// Errors returned by zone operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneError {
    /// The request cannot be satisfied from the zone's free span, or the
    /// backing pool has no contiguous run large enough. Recoverable: free
    /// something and retry, or fail the higher-level request.
    OutOfMemory {
        /// Bytes requested.
        requested: u64,
        /// Bytes free between head and tail at the time of the call.
        free: u64,
    },
    /// A free that would leave a hole behind a live block at the same
    /// end (double free, wrong offset, or broken ordering). A caller bug.
    InvalidFreeOrder {
        /// The end the free was presented to.
        end: End,
        /// Offset passed to the free.
        offset: u64,
        /// The end's boundary (head or tail) at the time of the call.
        boundary: u64,
    },
    /// The zone was quarantined after an earlier ordering violation and
    /// refuses further mutation.
    Quarantined {
        /// Name of the quarantined zone.
        zone: String,
    },
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested, free } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, {free} bytes free"
                )
            }
            Self::InvalidFreeOrder {
                end,
                offset,
                boundary,
            } => {
                write!(
                    f,
                    "out-of-order {end} free at {offset:#x} (boundary {boundary:#x})"
                )
            }
            Self::Quarantined { zone } => {
                write!(f, "zone '{zone}' is quarantined after a free-order violation")
            }
        }
    }
}

impl Error for ZoneError {}
