//! Overload policies (§4.3) — invoked under the queue lock once
//! `queue.occupied() >= capacity`, mirroring `runMaster`'s
//! `while (...) { master_info->policy(sh_info, master_info); }` loop.

use crate::error::DispatchError;
use crate::queue::{QueueState, Request, SharedState};
use rand::Rng;
use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::MutexGuard;
use std::time::{Instant, SystemTime};

/// One of the four admission-control strategies named on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
    Block,
    DropTail,
    DropHead,
    DropRandom,
}

impl Policy {
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "block" => Some(Self::Block),
            "dt" => Some(Self::DropTail),
            "dh" => Some(Self::DropHead),
            "random" => Some(Self::DropRandom),
            _ => None,
        }
    }

    /// Make room for `current` in `state`'s queue, retrying until
    /// `occupied() < state.capacity`. `current` is replaced in place by
    /// policies that drop the just-accepted connection and accept a fresh
    /// one (`drop_tail`, and the empty-queue fallback of `drop_head`/
    /// `drop_random`), exactly as `master_info->connfd` is overwritten in
    /// the C source.
    pub(crate) fn admit<'a>(
        self,
        shared: &'a SharedState,
        mut guard: MutexGuard<'a, QueueState>,
        listener: &TcpListener,
        current: &mut Request,
    ) -> Result<MutexGuard<'a, QueueState>, DispatchError> {
        while guard.occupied() >= shared.capacity {
            guard = match self {
                Self::Block => shared.not_full.wait(guard).unwrap(),
                Self::DropTail => {
                    drop(guard);
                    *current = Self::reaccept(listener)?;
                    shared.state.lock().unwrap()
                }
                Self::DropHead => {
                    if guard.queue.pop_front().is_some() {
                        guard
                    } else {
                        drop(guard);
                        *current = Self::reaccept(listener)?;
                        shared.state.lock().unwrap()
                    }
                }
                Self::DropRandom => {
                    if compact_random_half(&mut guard.queue) {
                        guard
                    } else {
                        drop(guard);
                        *current = Self::reaccept(listener)?;
                        shared.state.lock().unwrap()
                    }
                }
            };
        }
        Ok(guard)
    }

    fn reaccept(listener: &TcpListener) -> Result<Request, DispatchError> {
        let (stream, _addr) = listener.accept().map_err(DispatchError::Accept)?;
        Ok(Request {
            fd: crate::fd::Fd::new(stream),
            arrival_wall: SystemTime::now(),
            arrival_instant: Instant::now(),
        })
    }
}

/// Pick-and-swap sampling of `floor(n/2)` requests to keep, preserving
/// their relative order; the rest are dropped (closing their fds) in
/// place. Returns `false` (no-op) if the queue was already empty, the
/// signal to fall back to `drop_tail`.
fn compact_random_half(queue: &mut VecDeque<Request>) -> bool {
    let n = queue.len();
    if n == 0 {
        return false;
    }

    let mut rng = rand::thread_rng();
    let mut indexes: Vec<usize> = (0..n).collect();
    let mut keep = vec![false; n];
    let limit = n / 2;
    for i in 0..limit {
        let pick = rng.gen_range(0..(n - i));
        keep[indexes[pick]] = true;
        indexes[pick] = indexes[n - i - 1];
    }

    let drained: Vec<Request> = queue.drain(..).collect();
    for (kept, req) in keep.into_iter().zip(drained) {
        if kept {
            queue.push_back(req);
        }
        // else: `req` drops here, closing its fd.
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fd::Fd;
    use std::net::{TcpListener, TcpStream};

    fn dummy_request() -> Request {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();
        let (accepted, _) = listener.accept().unwrap();
        drop(stream);
        Request {
            fd: Fd::new(accepted),
            arrival_wall: SystemTime::now(),
            arrival_instant: Instant::now(),
        }
    }

    #[test]
    fn compact_random_half_keeps_floor_n_over_2() {
        let mut queue = VecDeque::new();
        for _ in 0..5 {
            queue.push_back(dummy_request());
        }
        assert!(compact_random_half(&mut queue));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn compact_random_half_drops_sole_entry() {
        let mut queue = VecDeque::new();
        queue.push_back(dummy_request());
        assert!(compact_random_half(&mut queue));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn compact_random_half_empty_queue_signals_fallback() {
        let mut queue: VecDeque<Request> = VecDeque::new();
        assert!(!compact_random_half(&mut queue));
    }

    #[test]
    fn from_token_matches_cli_spelling() {
        assert_eq!(Policy::from_token("block"), Some(Policy::Block));
        assert_eq!(Policy::from_token("dt"), Some(Policy::DropTail));
        assert_eq!(Policy::from_token("dh"), Some(Policy::DropHead));
        assert_eq!(Policy::from_token("random"), Some(Policy::DropRandom));
        assert_eq!(Policy::from_token("bogus"), None);
    }
}
