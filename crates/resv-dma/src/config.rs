//! Channel table configuration.

use std::error::Error;
use std::fmt;

/// Errors detected by [`DmaConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The table has no channels.
    NoChannels,
    /// A reserved channel lies outside the table.
    ReservedOutOfRange {
        /// The reserved channel.
        channel: usize,
        /// Number of channels in the table.
        count: usize,
    },
    /// The same channel is reserved twice.
    DuplicateReserved {
        /// The duplicated channel.
        channel: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChannels => write!(f, "channel_count must be at least 1"),
            Self::ReservedOutOfRange { channel, count } => {
                write!(f, "reserved channel {channel} outside table of {count}")
            }
            Self::DuplicateReserved { channel } => {
                write!(f, "channel {channel} reserved more than once")
            }
        }
    }
}

impl Error for ConfigError {}

/// Configuration for a [`DmaChannels`](crate::DmaChannels) table.
#[derive(Clone, Debug)]
pub struct DmaConfig {
    /// Number of channels. Default: 8 (two cascaded 4-channel controllers).
    pub channel_count: usize,
    /// Channels claimed from the start, with their labels.
    ///
    /// Default: channel 4 labelled `"cascade"`.
    pub reserved: Vec<(usize, String)>,
}

impl DmaConfig {
    /// Default channel count.
    pub const DEFAULT_CHANNEL_COUNT: usize = 8;

    /// Channel that links the slave controller to the master.
    pub const CASCADE_CHANNEL: usize = 4;

    /// A table of `channel_count` channels with nothing reserved.
    pub fn new(channel_count: usize) -> Self {
        Self {
            channel_count,
            reserved: Vec::new(),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_count == 0 {
            return Err(ConfigError::NoChannels);
        }
        for (i, (channel, _)) in self.reserved.iter().enumerate() {
            if *channel >= self.channel_count {
                return Err(ConfigError::ReservedOutOfRange {
                    channel: *channel,
                    count: self.channel_count,
                });
            }
            if self.reserved[i + 1..].iter().any(|(c, _)| c == channel) {
                return Err(ConfigError::DuplicateReserved { channel: *channel });
            }
        }
        Ok(())
    }
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self {
            channel_count: Self::DEFAULT_CHANNEL_COUNT,
            reserved: vec![(Self::CASCADE_CHANNEL, "cascade".to_owned())],
        }
    }
}
