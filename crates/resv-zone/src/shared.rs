//! Mutex-guarded zone handle with a misuse policy.
//!
//! [`SharedZone`] puts a [`Zone`] behind one `Mutex`, so every operation
//! (including the three pool calls of a tail allocation) runs as a single
//! critical section. It also decides what an out-of-order free means for
//! the zone's future via [`ViolationPolicy`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use resv_core::{BackingPool, End};

use crate::error::ZoneError;
use crate::zone::{Zone, ZoneStats};

/// What happens to a shared zone after an out-of-order free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViolationPolicy {
    /// Return the error; the zone stays usable.
    Propagate,
    /// Log the violation and refuse every later mutation with
    /// [`ZoneError::Quarantined`].
    #[default]
    Quarantine,
}

struct Guarded<P> {
    zone: Zone<P>,
    quarantined: bool,
}

/// Cloneable, thread-safe handle to a zone.
pub struct SharedZone<P> {
    inner: Arc<Mutex<Guarded<P>>>,
    policy: ViolationPolicy,
    name: Arc<str>,
}

impl<P> Clone for SharedZone<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            policy: self.policy,
            name: Arc::clone(&self.name),
        }
    }
}

impl<P: BackingPool> SharedZone<P> {
    /// Share `zone` under the given policy.
    pub fn new(zone: Zone<P>, policy: ViolationPolicy) -> Self {
        let name = Arc::from(zone.name());
        Self {
            inner: Arc::new(Mutex::new(Guarded {
                zone,
                quarantined: false,
            })),
            policy,
            name,
        }
    }

    /// See [`Zone::allocate_head`].
    pub fn allocate_head(&self, size: u64) -> Result<u64, ZoneError> {
        self.mutate(|z| z.allocate_head(size))
    }

    /// See [`Zone::allocate_tail`].
    pub fn allocate_tail(&self, size: u64) -> Result<u64, ZoneError> {
        self.mutate(|z| z.allocate_tail(size))
    }

    /// See [`Zone::free_head`].
    pub fn free_head(&self, offset: u64, size: u64) -> Result<(), ZoneError> {
        self.mutate(|z| z.free_head(offset, size))
    }

    /// See [`Zone::free_tail`].
    pub fn free_tail(&self, offset: u64, size: u64) -> Result<(), ZoneError> {
        self.mutate(|z| z.free_tail(offset, size))
    }

    /// See [`Zone::allocate`].
    pub fn allocate(&self, end: End, size: u64) -> Result<u64, ZoneError> {
        self.mutate(|z| z.allocate(end, size))
    }

    /// See [`Zone::release`].
    pub fn release(&self, end: End, offset: u64, size: u64) -> Result<(), ZoneError> {
        self.mutate(|z| z.release(end, offset, size))
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Zone<P>) -> Result<T, ZoneError>,
    ) -> Result<T, ZoneError> {
        let mut guarded = self.lock();
        if guarded.quarantined {
            return Err(ZoneError::Quarantined {
                zone: self.name.to_string(),
            });
        }
        let result = op(&mut guarded.zone);
        if let Err(err @ ZoneError::InvalidFreeOrder { .. }) = &result {
            if self.policy == ViolationPolicy::Quarantine {
                log::error!("zone '{}': {err}; quarantining", self.name);
                guarded.quarantined = true;
            }
        }
        result
    }
}

impl<P> SharedZone<P> {
    /// Zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The policy this handle was created with.
    pub fn policy(&self) -> ViolationPolicy {
        self.policy
    }

    /// Whether a violation has frozen the zone.
    pub fn is_quarantined(&self) -> bool {
        self.lock().quarantined
    }

    /// Snapshot of the zone's boundaries. Works on quarantined zones.
    pub fn stats(&self) -> ZoneStats {
        self.lock().zone.stats()
    }

    /// Translate a zone offset to an absolute address.
    ///
    /// # Panics
    ///
    /// Panics if `offset` exceeds the zone size.
    pub fn address_of(&self, offset: u64) -> u64 {
        self.lock().zone.address_of(offset)
    }

    /// Run `f` with read access to the zone under the lock.
    pub fn with_zone<R>(&self, f: impl FnOnce(&Zone<P>) -> R) -> R {
        f(&self.lock().zone)
    }

    /// Recover the zone if this is the last handle.
    pub fn try_unwrap(self) -> Result<Zone<P>, Self> {
        let Self {
            inner,
            policy,
            name,
        } = self;
        match Arc::try_unwrap(inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner).zone),
            Err(inner) => Err(Self {
                inner,
                policy,
                name,
            }),
        }
    }

    // Zone operations never leave partial state behind a panic, so a
    // poisoned lock still guards a consistent zone.
    fn lock(&self) -> MutexGuard<'_, Guarded<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;
    use resv_pool::FirstFitPool;
    use std::thread;

    fn shared(size: u64, policy: ViolationPolicy) -> SharedZone<FirstFitPool> {
        SharedZone::new(
            Zone::with_first_fit(ZoneConfig::new("shared", size)).unwrap(),
            policy,
        )
    }

    #[test]
    fn clones_share_state() {
        let a = shared(1000, ViolationPolicy::default());
        let b = a.clone();
        a.allocate_head(100).unwrap();
        assert_eq!(b.stats().head, 100);
    }

    #[test]
    fn quarantine_freezes_zone() {
        let z = shared(1000, ViolationPolicy::Quarantine);
        let off = z.allocate_head(100).unwrap();
        assert!(matches!(
            z.free_head(500, 10),
            Err(ZoneError::InvalidFreeOrder { .. })
        ));
        assert!(z.is_quarantined());
        assert_eq!(
            z.free_head(off, 100),
            Err(ZoneError::Quarantined {
                zone: "shared".into()
            })
        );
        assert!(matches!(
            z.allocate_tail(10),
            Err(ZoneError::Quarantined { .. })
        ));
        // Reads still work and show the pre-violation state.
        assert_eq!(z.stats().head, 100);
    }

    #[test]
    fn propagate_keeps_zone_usable() {
        let z = shared(1000, ViolationPolicy::Propagate);
        let off = z.allocate_head(100).unwrap();
        assert!(z.free_head(500, 10).is_err());
        assert!(!z.is_quarantined());
        assert_eq!(z.free_head(off, 100), Ok(()));
    }

    #[test]
    fn out_of_memory_does_not_quarantine() {
        let z = shared(100, ViolationPolicy::Quarantine);
        assert!(z.allocate_head(200).is_err());
        assert!(!z.is_quarantined());
    }

    #[test]
    fn try_unwrap_needs_last_handle() {
        let a = shared(100, ViolationPolicy::default());
        let b = a.clone();
        let a = a.try_unwrap().err().unwrap();
        drop(b);
        let zone = a.try_unwrap().ok().unwrap();
        assert_eq!(zone.total_size(), 100);
    }

    #[test]
    fn concurrent_allocations_keep_invariant() {
        let z = shared(64 * 1024, ViolationPolicy::Propagate);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let z = z.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 2 == 0 {
                            let _ = z.allocate_head(16);
                        } else {
                            let _ = z.allocate_tail(16);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let stats = z.stats();
        assert_eq!(stats.free, stats.tail - stats.head);
        assert_eq!(stats.head, 400 * 16);
        assert_eq!(stats.tail, 64 * 1024 - 400 * 16);
        z.with_zone(|zone| assert_eq!(zone.pool().available(), stats.free));
    }
}
