//! DMA claim errors.

use std::error::Error;
use std::fmt;

/// Errors from [`DmaChannels::request`](crate::DmaChannels::request).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DmaError {
    /// The channel number is outside the table.
    InvalidChannel {
        /// The requested channel.
        channel: usize,
        /// Number of channels in the table.
        count: usize,
    },
    /// Another device already holds the channel.
    Busy {
        /// The requested channel.
        channel: usize,
        /// Label of the current holder.
        owner: String,
    },
}

impl fmt::Display for DmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel { channel, count } => {
                write!(f, "DMA{channel} does not exist ({count} channels)")
            }
            Self::Busy { channel, owner } => {
                write!(f, "DMA{channel} is busy (held by '{owner}')")
            }
        }
    }
}

impl Error for DmaError {}
