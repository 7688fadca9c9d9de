//! `brd <port> <threads> <queue_capacity> <policy>` (§6.2).
//!
//! Replaces the C `getargs`' manual `argv` indexing with `clap::Parser`.
//! `main` uses `try_parse` rather than `parse` so a malformed argument
//! list exits with code 1, per the contract, instead of clap's own
//! default exit code 2.

use crate::policy::Policy;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "brd", about = "Bounded request dispatcher")]
pub(crate) struct Cli {
    /// TCP port to listen on.
    pub(crate) port: u16,
    /// Number of worker threads.
    pub(crate) threads: usize,
    /// Fixed capacity of the admission queue (`queue.size + in_flight`).
    pub(crate) queue_capacity: usize,
    /// Overload policy: `block`, `dt`, `dh`, or `random`.
    pub(crate) policy: String,
    /// Document root served by the built-in static-file handler.
    #[arg(long, default_value = "./public")]
    pub(crate) document_root: String,
}

impl Cli {
    pub(crate) fn policy(&self) -> Option<Policy> {
        Policy::from_token(&self.policy)
    }
}
