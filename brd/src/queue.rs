//! The request queue, in-flight table, and worker counters (§3, §4.1) —
//! all three live behind the one mutex the spec requires, since admission
//! decisions need `queue.size + in_flight_count` and counter snapshots need
//! to serialize with dequeue, under the same lock.

use crate::fd::Fd;
use crate::stats::WorkerCounters;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Instant, SystemTime};

/// A connection plus the two timestamps the dispatcher tracks for it.
pub(crate) struct Request {
    pub(crate) fd: Fd,
    /// Wall-clock arrival time, for the `Stat-Req-Arrival::` header.
    pub(crate) arrival_wall: SystemTime,
    /// Monotonic arrival time, for computing `dispatch_interval` safely.
    pub(crate) arrival_instant: Instant,
}

/// What worker `i`'s in-flight slot records while it owns a request —
/// just enough to answer "is this worker busy", not the fd itself.
#[derive(Clone, Copy)]
pub(crate) struct InFlightSlot {
    pub(crate) arrival_wall: SystemTime,
}

/// Everything the queue mutex guards: the ring of pending requests, the
/// fixed-size in-flight table (one slot per worker, §3), and each worker's
/// running counters.
pub(crate) struct QueueState {
    pub(crate) queue: VecDeque<Request>,
    pub(crate) in_flight: Vec<Option<InFlightSlot>>,
    pub(crate) in_flight_count: usize,
    pub(crate) counters: Vec<WorkerCounters>,
}

impl QueueState {
    fn new(num_workers: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            in_flight: vec![None; num_workers],
            in_flight_count: 0,
            counters: vec![WorkerCounters::default(); num_workers],
        }
    }

    /// `queue.size + in_flight_count`, the quantity capacity bounds (§3).
    pub(crate) fn occupied(&self) -> usize {
        self.queue.len() + self.in_flight_count
    }
}

/// State shared between the acceptor thread and every worker thread.
pub(crate) struct SharedState {
    pub(crate) capacity: usize,
    pub(crate) state: Mutex<QueueState>,
    /// Workers wait here while the queue is empty; broadcast on enqueue
    /// since more than one worker may be parked (§4.1).
    pub(crate) not_empty: Condvar,
    /// The acceptor (only under `block`) waits here for room; signalled —
    /// never broadcast — since at most one thread ever waits on it (§4.1).
    pub(crate) not_full: Condvar,
}

impl SharedState {
    pub(crate) fn new(capacity: usize, num_workers: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState::new(num_workers)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_counts_queue_and_in_flight() {
        let mut state = QueueState::new(2);
        assert_eq!(state.occupied(), 0);
        state.in_flight[0] = Some(InFlightSlot {
            arrival_wall: SystemTime::now(),
        });
        state.in_flight_count = 1;
        assert_eq!(state.occupied(), 1);
    }
}
