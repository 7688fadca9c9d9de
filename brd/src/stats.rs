//! The per-request stats snapshot handed to a handler (§6.1).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A `(seconds, microseconds)` pair, the wire shape the handler contract's
/// `Stat-Req-Arrival::`/`Stat-Req-Dispatch::` headers are written in —
/// exactly the C `struct timeval` layout `buf_stats` formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecUsec {
    pub sec: u64,
    pub usec: u32,
}

impl SecUsec {
    pub(crate) fn from_epoch(time: SystemTime) -> Self {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        Self {
            sec: since_epoch.as_secs(),
            usec: since_epoch.subsec_micros(),
        }
    }

    pub(crate) fn from_duration(duration: Duration) -> Self {
        Self {
            sec: duration.as_secs(),
            usec: duration.subsec_micros(),
        }
    }
}

/// Worker counters as they stood immediately *before* the current request —
/// the handler contract requires the `+1` to be applied by the handler
/// itself when it knows whether the request turned out static or dynamic.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WorkerCounters {
    pub(crate) total: u64,
    pub(crate) static_count: u64,
    pub(crate) dynamic_count: u64,
}

/// Snapshot passed to [`crate::handler::RequestHandler::handle`]. Built by
/// the worker at dequeue time, under the queue lock, per §4.4.
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub arrival_time: SecUsec,
    pub dispatch_interval: SecUsec,
    pub thread_id: usize,
    pub requests_count: u64,
    pub static_requests_count: u64,
    pub dynamic_requests_count: u64,
}
