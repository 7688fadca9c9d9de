//! The acceptor loop (§4.2) — direct port of `runMaster` in `server.c`.

use crate::error::DispatchError;
use crate::fd::Fd;
use crate::policy::Policy;
use crate::queue::{Request, SharedState};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

pub(crate) fn run(
    listener: TcpListener,
    shared: Arc<SharedState>,
    policy: Policy,
) -> Result<(), DispatchError> {
    loop {
        let (stream, _addr) = listener.accept().map_err(DispatchError::Accept)?;
        let mut request = Request {
            fd: Fd::new(stream),
            arrival_wall: SystemTime::now(),
            arrival_instant: Instant::now(),
        };

        let guard = shared.state.lock().unwrap();
        let mut guard = policy.admit(&shared, guard, &listener, &mut request)?;

        guard.queue.push_back(request);
        shared.not_empty.notify_all();
        drop(guard);

        log::debug!("acceptor: request enqueued");
    }
}
