//! Zone owned by a dedicated thread.
//!
//! [`ZoneWorker`] is the message-passing alternative to [`SharedZone`](crate::SharedZone):
//! the zone moves onto its own thread and every operation becomes a
//! request on a bounded channel. The thread handles one request at a time,
//! so operations are serialised without a lock.
//!
//! ```text
//! Caller thread(s)                   Zone thread
//!     |                                  |
//!     |--Request + reply_tx ------------>| req_rx.recv()
//!     |   [req_tx: bounded(64)]          | zone.allocate / release
//!     |<--result via reply_tx (bounded 1)|
//!     |                                  |
//!     |--shutdown(): drop req_tx ------->| loop ends, returns Zone
//!     |<--join() ------------------------|
//! ```

use std::error::Error;
use std::fmt;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use resv_core::{BackingPool, End};

use crate::error::ZoneError;
use crate::zone::{Zone, ZoneStats};

/// Capacity of the request channel.
const REQUEST_QUEUE: usize = 64;

// ── Error types ──────────────────────────────────────────────────

/// Error from a [`ZoneWorker`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerError {
    /// The zone thread has shut down.
    Shutdown,
    /// The zone refused the operation.
    Zone(ZoneError),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "zone thread has shut down"),
            Self::Zone(e) => write!(f, "zone: {e}"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Zone(e) => Some(e),
            Self::Shutdown => None,
        }
    }
}

impl From<ZoneError> for WorkerError {
    fn from(e: ZoneError) -> Self {
        Self::Zone(e)
    }
}

// ── Requests ─────────────────────────────────────────────────────

enum Request {
    Allocate {
        end: End,
        size: u64,
        reply: Sender<Result<u64, ZoneError>>,
    },
    Release {
        end: End,
        offset: u64,
        size: u64,
        reply: Sender<Result<(), ZoneError>>,
    },
    Stats {
        reply: Sender<ZoneStats>,
    },
}

fn serve<P: BackingPool>(mut zone: Zone<P>, requests: Receiver<Request>) -> Zone<P> {
    for request in requests {
        // A dropped reply receiver means the caller gave up; nothing to do.
        match request {
            Request::Allocate { end, size, reply } => {
                let _ = reply.send(zone.allocate(end, size));
            }
            Request::Release {
                end,
                offset,
                size,
                reply,
            } => {
                let _ = reply.send(zone.release(end, offset, size));
            }
            Request::Stats { reply } => {
                let _ = reply.send(zone.stats());
            }
        }
    }
    zone
}

// ── ZoneWorker ───────────────────────────────────────────────────

/// Handle to a zone running on its own thread.
///
/// Calls block until the zone thread replies. Dropping the handle stops
/// the thread and discards the zone; [`shutdown`](Self::shutdown) stops
/// it and hands the zone back.
pub struct ZoneWorker<P: BackingPool + Send + 'static> {
    name: String,
    req_tx: Option<Sender<Request>>,
    thread: Option<JoinHandle<Zone<P>>>,
}

impl<P: BackingPool + Send + 'static> ZoneWorker<P> {
    /// Move `zone` onto a new thread named after it.
    pub fn spawn(zone: Zone<P>) -> Self {
        let name = zone.name().to_owned();
        let (req_tx, req_rx) = crossbeam_channel::bounded(REQUEST_QUEUE);
        let thread = thread::Builder::new()
            .name(format!("resv-zone-{name}"))
            .spawn(move || serve(zone, req_rx))
            .expect("failed to spawn zone thread");
        log::debug!("zone '{name}': worker started");
        Self {
            name,
            req_tx: Some(req_tx),
            thread: Some(thread),
        }
    }

    /// See [`Zone::allocate_head`].
    pub fn allocate_head(&self, size: u64) -> Result<u64, WorkerError> {
        self.allocate(End::Head, size)
    }

    /// See [`Zone::allocate_tail`].
    pub fn allocate_tail(&self, size: u64) -> Result<u64, WorkerError> {
        self.allocate(End::Tail, size)
    }

    /// See [`Zone::free_head`].
    pub fn free_head(&self, offset: u64, size: u64) -> Result<(), WorkerError> {
        self.release(End::Head, offset, size)
    }

    /// See [`Zone::free_tail`].
    pub fn free_tail(&self, offset: u64, size: u64) -> Result<(), WorkerError> {
        self.release(End::Tail, offset, size)
    }

    /// See [`Zone::allocate`].
    pub fn allocate(&self, end: End, size: u64) -> Result<u64, WorkerError> {
        Ok(self.call(|reply| Request::Allocate { end, size, reply })??)
    }

    /// See [`Zone::release`].
    pub fn release(&self, end: End, offset: u64, size: u64) -> Result<(), WorkerError> {
        Ok(self.call(|reply| Request::Release {
            end,
            offset,
            size,
            reply,
        })??)
    }

    /// Boundary snapshot taken on the zone thread.
    pub fn stats(&self) -> Result<ZoneStats, WorkerError> {
        self.call(|reply| Request::Stats { reply })
    }

    /// Zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the zone thread and return the zone.
    ///
    /// Returns `None` if the thread panicked.
    pub fn shutdown(mut self) -> Option<Zone<P>> {
        self.stop()
    }

    fn call<T>(&self, make: impl FnOnce(Sender<T>) -> Request) -> Result<T, WorkerError> {
        let req_tx = self.req_tx.as_ref().ok_or(WorkerError::Shutdown)?;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        req_tx
            .send(make(reply_tx))
            .map_err(|_| WorkerError::Shutdown)?;
        reply_rx.recv().map_err(|_| WorkerError::Shutdown)
    }

    fn stop(&mut self) -> Option<Zone<P>> {
        // Closing the request channel ends the serve loop.
        self.req_tx.take();
        let zone = self.thread.take()?.join().ok();
        log::debug!("zone '{}': worker stopped", self.name);
        zone
    }
}

impl<P: BackingPool + Send + 'static> Drop for ZoneWorker<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
