//! Per-owner zone registry.
//!
//! [`ZoneRegistry`] maps each [`OwnerId`] to a [`SharedZone`] plus a
//! [`ZonePolicy`]: the end allocations come from and an optional cap on
//! live regions. Callers allocate by owner and get back an
//! [`Allocation`] that carries everything needed to free it again.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use resv_core::{BackingPool, End, Extent, OwnerId};

use crate::error::ZoneError;
use crate::shared::SharedZone;
use crate::zone::ZoneStats;

/// How a registered owner allocates from its zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZonePolicy {
    /// End every allocation for this owner comes from. Default: head.
    pub end: End,
    /// Maximum live allocations made through the registry. `None` = no cap.
    pub max_regions: Option<u32>,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            end: End::Head,
            max_regions: None,
        }
    }
}

/// A live allocation handed out by [`ZoneRegistry::allocate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Owner whose zone holds the block.
    pub owner: OwnerId,
    /// End the block came from.
    pub end: End,
    /// Zone-relative range of the block.
    pub extent: Extent,
    /// Absolute address of the first byte.
    pub address: u64,
}

/// Errors from registry operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// No zone is registered for this owner.
    UnknownOwner {
        /// The missing owner.
        owner: OwnerId,
    },
    /// The owner already has a zone.
    DuplicateOwner {
        /// The duplicate owner.
        owner: OwnerId,
    },
    /// The owner already holds its maximum number of live regions.
    RegionLimit {
        /// The owner at its limit.
        owner: OwnerId,
        /// The configured limit.
        max: u32,
    },
    /// The zone refused the operation.
    Zone(ZoneError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOwner { owner } => write!(f, "no zone registered for owner {owner}"),
            Self::DuplicateOwner { owner } => {
                write!(f, "owner {owner} already has a zone")
            }
            Self::RegionLimit { owner, max } => {
                write!(f, "owner {owner} already holds {max} regions")
            }
            Self::Zone(e) => write!(f, "zone: {e}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Zone(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ZoneError> for RegistryError {
    fn from(e: ZoneError) -> Self {
        Self::Zone(e)
    }
}

struct Entry<P> {
    zone: SharedZone<P>,
    policy: ZonePolicy,
    live: u32,
}

/// Owner-keyed collection of zones, iterated in registration order.
pub struct ZoneRegistry<P> {
    zones: IndexMap<OwnerId, Entry<P>>,
}

impl<P> Default for ZoneRegistry<P> {
    fn default() -> Self {
        Self {
            zones: IndexMap::new(),
        }
    }
}

impl<P: BackingPool> ZoneRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `zone` for `owner`.
    pub fn register(
        &mut self,
        owner: OwnerId,
        zone: SharedZone<P>,
        policy: ZonePolicy,
    ) -> Result<(), RegistryError> {
        if self.zones.contains_key(&owner) {
            return Err(RegistryError::DuplicateOwner { owner });
        }
        log::debug!(
            "registry: owner {owner} -> zone '{}' ({} allocations)",
            zone.name(),
            policy.end
        );
        self.zones.insert(
            owner,
            Entry {
                zone,
                policy,
                live: 0,
            },
        );
        Ok(())
    }

    /// Remove an owner's zone, returning its handle.
    pub fn unregister(&mut self, owner: OwnerId) -> Option<SharedZone<P>> {
        self.zones.shift_remove(&owner).map(|e| e.zone)
    }

    /// Allocate `size` bytes for `owner` from its configured end.
    pub fn allocate(&mut self, owner: OwnerId, size: u64) -> Result<Allocation, RegistryError> {
        let entry = self
            .zones
            .get_mut(&owner)
            .ok_or(RegistryError::UnknownOwner { owner })?;
        if let Some(max) = entry.policy.max_regions {
            if entry.live >= max {
                return Err(RegistryError::RegionLimit { owner, max });
            }
        }

        let end = entry.policy.end;
        let offset = entry.zone.allocate(end, size)?;
        entry.live += 1;
        let allocation = Allocation {
            owner,
            end,
            extent: Extent::new(offset, size),
            address: entry.zone.address_of(offset),
        };
        log::debug!(
            "registry: owner {owner} allocated {size} bytes at {:#x} ({end})",
            allocation.address
        );
        Ok(allocation)
    }

    /// Free a block previously returned by [`allocate`](Self::allocate).
    pub fn free(&mut self, allocation: &Allocation) -> Result<(), RegistryError> {
        let owner = allocation.owner;
        let entry = self
            .zones
            .get_mut(&owner)
            .ok_or(RegistryError::UnknownOwner { owner })?;
        entry.zone.release(
            allocation.end,
            allocation.extent.offset,
            allocation.extent.len,
        )?;
        entry.live = entry.live.saturating_sub(1);
        log::debug!(
            "registry: owner {owner} freed {} bytes at {:#x}",
            allocation.extent.len,
            allocation.address
        );
        Ok(())
    }
}

impl<P> ZoneRegistry<P> {
    /// Registered owners in registration order.
    pub fn owners(&self) -> impl Iterator<Item = OwnerId> + '_ {
        self.zones.keys().copied()
    }

    /// The zone registered for `owner`.
    pub fn zone(&self, owner: OwnerId) -> Option<&SharedZone<P>> {
        self.zones.get(&owner).map(|e| &e.zone)
    }

    /// Live allocations made through the registry for `owner`.
    pub fn live_regions(&self, owner: OwnerId) -> Option<u32> {
        self.zones.get(&owner).map(|e| e.live)
    }

    /// Boundary snapshot of `owner`'s zone.
    pub fn stats(&self, owner: OwnerId) -> Option<ZoneStats> {
        self.zones.get(&owner).map(|e| e.zone.stats())
    }

    /// Number of registered owners.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no owners are registered.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
