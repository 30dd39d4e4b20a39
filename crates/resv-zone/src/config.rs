//! Zone configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── FreeCheck ──────────────────────────────────────────────────────

/// How strictly frees are checked against the allocation order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreeCheck {
    /// A head free must lie entirely below the head boundary and a tail
    /// free must start at or below the tail boundary. Freeing an older
    /// head block before a newer one is accepted.
    #[default]
    Boundary,
    /// The freed block must be exactly the most recent one at its end:
    /// it ends at the head boundary, or starts at the tail boundary.
    Strict,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`ZoneConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Zone size is zero.
    EmptyZone,
    /// Granule is zero or not a power of two.
    BadGranule {
        /// The configured granule.
        granule: u64,
    },
    /// Zone size is not a whole number of granules.
    Misaligned {
        /// The configured size.
        size: u64,
        /// The configured granule.
        granule: u64,
    },
    /// `base + size` does not fit in the address space.
    AddressOverflow {
        /// The configured base address.
        base: u64,
        /// The configured size.
        size: u64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyZone => write!(f, "zone size must be at least 1"),
            Self::BadGranule { granule } => {
                write!(f, "granule {granule} is not a non-zero power of two")
            }
            Self::Misaligned { size, granule } => {
                write!(f, "zone size {size} is not a multiple of granule {granule}")
            }
            Self::AddressOverflow { base, size } => {
                write!(f, "zone at {base:#x} of {size} bytes overflows the address space")
            }
        }
    }
}

impl Error for ConfigError {}

// ── ZoneConfig ─────────────────────────────────────────────────────

/// Configuration for a [`Zone`](crate::Zone).
///
/// Validated once at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ZoneConfig {
    /// Human-readable zone name, used in diagnostics.
    pub name: String,
    /// Absolute address of offset 0. Default: 0.
    pub base: u64,
    /// Fixed extent of the zone in bytes.
    pub size: u64,
    /// Every request size is rounded up to a multiple of this.
    ///
    /// Default: 1. Must be a power of two and should match the backing
    /// pool's own granule, otherwise the pool rounds behind the zone's
    /// back and the free accounting drifts.
    pub granule: u64,
    /// Ordering check applied to frees. Default: [`FreeCheck::Boundary`].
    pub free_check: FreeCheck,
}

impl ZoneConfig {
    /// Default granule: byte-granular.
    pub const DEFAULT_GRANULE: u64 = 1;

    /// Create a config for a zone of `size` bytes at base 0.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            base: 0,
            size,
            granule: Self::DEFAULT_GRANULE,
            free_check: FreeCheck::default(),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::EmptyZone);
        }
        if !self.granule.is_power_of_two() {
            return Err(ConfigError::BadGranule {
                granule: self.granule,
            });
        }
        if self.size % self.granule != 0 {
            return Err(ConfigError::Misaligned {
                size: self.size,
                granule: self.granule,
            });
        }
        if self.base.checked_add(self.size).is_none() {
            return Err(ConfigError::AddressOverflow {
                base: self.base,
                size: self.size,
            });
        }
        Ok(())
    }
}
