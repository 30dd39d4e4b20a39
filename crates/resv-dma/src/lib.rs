//! Exclusive claim registry for numbered legacy DMA channels.
//!
//! [`DmaChannels`] holds a fixed number of channels. A channel is either
//! free or claimed by exactly one device label; the claim is an atomic
//! swap, so concurrent requests for the same channel have one winner.
//! Some channels can be reserved at construction (the default reserves
//! channel 4 for the cascade between the two legacy controllers).
//!
//! Releasing a channel that is out of range or already free is logged
//! and otherwise ignored.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channels;
pub mod config;
pub mod error;

pub use channels::{ChannelGuard, DmaChannels};
pub use config::{ConfigError, DmaConfig};
pub use error::DmaError;
