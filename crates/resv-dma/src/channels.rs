//! The channel table.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{ConfigError, DmaConfig};
use crate::error::DmaError;

struct Slot {
    busy: AtomicBool,
    /// Label of the current holder. `busy` only changes while this lock
    /// is held; readers of `busy` alone need no lock.
    owner: Mutex<Option<String>>,
    /// Bumped on every successful claim, under the `owner` lock.
    generation: AtomicU64,
}

impl Slot {
    fn owner(&self) -> MutexGuard<'_, Option<String>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed table of exclusively claimable DMA channels.
///
/// All methods take `&self`; the table can be shared across threads
/// behind an `Arc` or a `static`.
pub struct DmaChannels {
    slots: Box<[Slot]>,
}

impl DmaChannels {
    /// Build a table from `config`, claiming its reserved channels.
    pub fn new(config: DmaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let slots = (0..config.channel_count)
            .map(|_| Slot {
                busy: AtomicBool::new(false),
                owner: Mutex::new(None),
                generation: AtomicU64::new(0),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        for (channel, label) in config.reserved {
            slots[channel].busy.store(true, Ordering::Relaxed);
            *slots[channel].owner() = Some(label);
        }
        Ok(Self { slots })
    }

    /// Claim `channel` for `device_id`.
    ///
    /// The first claimant wins; later requests get [`DmaError::Busy`]
    /// until the channel is freed.
    pub fn request(&self, channel: usize, device_id: &str) -> Result<(), DmaError> {
        self.acquire(channel, device_id).map(|_| ())
    }

    fn acquire(&self, channel: usize, device_id: &str) -> Result<u64, DmaError> {
        let slot = self.slot(channel).ok_or(DmaError::InvalidChannel {
            channel,
            count: self.slots.len(),
        })?;
        let mut owner = slot.owner();
        if slot.busy.swap(true, Ordering::AcqRel) {
            let owner = owner.clone().unwrap_or_default();
            return Err(DmaError::Busy { channel, owner });
        }
        *owner = Some(device_id.to_owned());
        let generation = slot.generation.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!("DMA{channel}: claimed by '{device_id}'");
        Ok(generation)
    }

    /// Release `channel`.
    ///
    /// Out-of-range and already-free channels are logged and ignored.
    pub fn free(&self, channel: usize) {
        let Some(slot) = self.slot(channel) else {
            log::warn!("Trying to free DMA{channel}");
            return;
        };
        let mut owner = slot.owner();
        if !slot.busy.swap(false, Ordering::AcqRel) {
            log::warn!("Trying to free free DMA{channel}");
            return;
        }
        if let Some(label) = owner.take() {
            log::debug!("DMA{channel}: released by '{label}'");
        }
    }

    /// Claim `channel` and release it when the guard drops.
    ///
    /// If the channel is freed by hand and claimed again while the guard
    /// is alive, dropping the guard leaves the newer claim in place.
    pub fn claim(&self, channel: usize, device_id: &str) -> Result<ChannelGuard<'_>, DmaError> {
        let generation = self.acquire(channel, device_id)?;
        Ok(ChannelGuard {
            channels: self,
            channel,
            generation,
        })
    }

    /// Free `channel` only if it is still held by claim `generation`.
    fn release_claim(&self, channel: usize, generation: u64) {
        let Some(slot) = self.slot(channel) else {
            return;
        };
        let mut owner = slot.owner();
        if !slot.busy.load(Ordering::Acquire)
            || slot.generation.load(Ordering::Relaxed) != generation
        {
            log::warn!("DMA{channel}: stale guard dropped; claim already released");
            return;
        }
        slot.busy.store(false, Ordering::Release);
        if let Some(label) = owner.take() {
            log::debug!("DMA{channel}: released by '{label}'");
        }
    }

    /// Whether `channel` is currently claimed. Out-of-range is `false`.
    pub fn is_busy(&self, channel: usize) -> bool {
        self.slot(channel)
            .is_some_and(|s| s.busy.load(Ordering::Acquire))
    }

    /// Label of the current holder of `channel`.
    pub fn owner(&self, channel: usize) -> Option<String> {
        self.slot(channel)?.owner().clone()
    }

    /// Claimed channels and their holders, ascending by channel.
    pub fn busy_channels(&self) -> Vec<(usize, String)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.busy.load(Ordering::Acquire))
            .map(|(i, s)| (i, s.owner().clone().unwrap_or_default()))
            .collect()
    }

    /// Number of channels in the table.
    pub fn channel_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, channel: usize) -> Option<&Slot> {
        self.slots.get(channel)
    }
}

impl Default for DmaChannels {
    fn default() -> Self {
        // The default config always validates.
        match Self::new(DmaConfig::default()) {
            Ok(channels) => channels,
            Err(e) => unreachable!("default DMA config rejected: {e}"),
        }
    }
}

/// One line per claimed channel: `" 4: cascade"`.
impl fmt::Display for DmaChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (channel, owner) in self.busy_channels() {
            writeln!(f, "{channel:2}: {owner}")?;
        }
        Ok(())
    }
}

/// A claimed channel, released on drop.
pub struct ChannelGuard<'a> {
    channels: &'a DmaChannels,
    channel: usize,
    generation: u64,
}

impl ChannelGuard<'_> {
    /// The claimed channel number.
    pub fn channel(&self) -> usize {
        self.channel
    }
}

impl Drop for ChannelGuard<'_> {
    fn drop(&mut self) {
        self.channels.release_claim(self.channel, self.generation);
    }
}
