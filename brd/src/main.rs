//! Bounded Request Dispatcher: a fixed-capacity admission queue shared by
//! one acceptor and N workers, governed by a pluggable overload policy.
//! Direct port of `server.c`'s pthread/mutex/condvar dispatcher core.

mod acceptor;
mod cli;
mod error;
mod fd;
mod handler;
mod policy;
mod queue;
mod static_handler;
mod stats;
#[cfg(test)]
mod tests_integration;
mod worker;

use clap::Parser;
use cli::Cli;
use error::DispatchError;
use handler::RequestHandler;
use queue::SharedState;
use static_handler::StaticFileHandler;
use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprint!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let Some(policy) = cli.policy() else {
        log::error!("invalid policy '{}': expected block|dt|dh|random", cli.policy);
        return ExitCode::FAILURE;
    };

    let handler: Arc<dyn RequestHandler> = Arc::new(StaticFileHandler::new(&cli.document_root));

    match run(cli.port, cli.threads, cli.queue_capacity, policy, handler) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    port: u16,
    threads: usize,
    queue_capacity: usize,
    policy: policy::Policy,
    handler: Arc<dyn RequestHandler>,
) -> Result<(), DispatchError> {
    let listener = bind_listener(port).map_err(DispatchError::Bind)?;
    log::info!("brd listening on port {port} ({threads} workers, capacity {queue_capacity})");

    let shared = Arc::new(SharedState::new(queue_capacity, threads));

    let worker_handles: Vec<_> = (0..threads)
        .map(|worker_id| {
            let shared = Arc::clone(&shared);
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || worker::run(worker_id, shared, handler))
        })
        .collect();

    let acceptor_result = acceptor::run(listener, shared, policy);

    for handle in worker_handles {
        let _ = handle.join();
    }

    acceptor_result
}

/// Build the listening socket via `socket2` instead of `TcpListener::bind`
/// directly, so `SO_REUSEADDR` can be set before `bind` — lets a restarted
/// `brd` reclaim the port immediately instead of sitting in `TIME_WAIT`.
fn bind_listener(port: u16) -> std::io::Result<TcpListener> {
    use socket2::{Domain, Socket, Type};
    use std::net::SocketAddr;

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    Ok(socket.into())
}
