//! Strongly-typed identifiers and byte-range types.

use std::fmt;

/// Identifies a client that owns a zone in a registry.
///
/// Owners are registered once and keep their ID for the registry's
/// lifetime. `OwnerId(n)` carries no ordering meaning beyond identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u32);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OwnerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Which end of a zone an allocation is taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum End {
    /// The low-address end; allocations grow upwards.
    Head,
    /// The high-address end; allocations grow downwards.
    Tail,
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Tail => write!(f, "tail"),
        }
    }
}

/// A half-open byte range `[offset, offset + len)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Extent {
    /// First byte of the range.
    pub offset: u64,
    /// Number of bytes in the range.
    pub len: u64,
}

impl Extent {
    /// Create an extent starting at `offset` spanning `len` bytes.
    pub const fn new(offset: u64, len: u64) -> Self {
        Self { offset, len }
    }

    /// One past the last byte, or `None` if the range wraps `u64`.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.len)
    }

    /// Whether the extent covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `addr` lies inside the extent.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.offset && addr - self.offset < self.len
    }

    /// Whether the two extents share at least one byte.
    pub fn overlaps(&self, other: &Extent) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.offset < other.offset.saturating_add(other.len)
            && other.offset < self.offset.saturating_add(self.len)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.offset, self.offset.saturating_add(self.len))
    }
}
