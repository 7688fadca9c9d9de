//! The worker loop (§4.4) — direct port of `workerFunction` in `server.c`.

use crate::error::HandleResult;
use crate::handler::RequestHandler;
use crate::queue::{InFlightSlot, SharedState};
use crate::stats::{SecUsec, Stats};
use std::sync::Arc;
use std::time::Instant;

pub(crate) fn run(worker_id: usize, shared: Arc<SharedState>, handler: Arc<dyn RequestHandler>) {
    loop {
        let mut guard = shared.state.lock().unwrap();
        while guard.queue.is_empty() {
            guard = shared.not_empty.wait(guard).unwrap();
        }
        let request = guard.queue.pop_front().unwrap();

        let dispatch_interval = Instant::now().saturating_duration_since(request.arrival_instant);
        let counters_before = guard.counters[worker_id];

        guard.in_flight[worker_id] = Some(InFlightSlot {
            arrival_wall: request.arrival_wall,
        });
        guard.in_flight_count += 1;

        let stats = Stats {
            arrival_time: SecUsec::from_epoch(request.arrival_wall),
            dispatch_interval: SecUsec::from_duration(dispatch_interval),
            thread_id: worker_id,
            requests_count: counters_before.total,
            static_requests_count: counters_before.static_count,
            dynamic_requests_count: counters_before.dynamic_count,
        };

        shared.not_full.notify_one();
        drop(guard);

        let mut fd = request.fd;
        let result = handler.handle(&mut fd, &stats);
        drop(fd);

        let mut guard = shared.state.lock().unwrap();
        let counters = &mut guard.counters[worker_id];
        counters.total += 1;
        match result {
            HandleResult::Static => counters.static_count += 1,
            HandleResult::Dynamic => counters.dynamic_count += 1,
            HandleResult::Error(_) => {}
        }
        guard.in_flight[worker_id] = None;
        guard.in_flight_count -= 1;
        shared.not_full.notify_one();
        drop(guard);

        log::debug!("worker {worker_id}: handled request ({result:?})");
    }
}
