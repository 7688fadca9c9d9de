//! The handler contract BRD dispatches to once a request is dequeued (§6.1).
//!
//! Deliberately the only seam between the admission/dispatch core this crate
//! implements and the wire-protocol work (`handle(fd, stats) -> result`) the
//! specification treats as an external collaborator.

use crate::{error::HandleResult, fd::Fd, stats::Stats};

/// Implemented once per deployment to actually serve a request. BRD's own
/// correctness (queue bounds, FIFO order, fd lifecycle) does not depend on
/// any particular implementation — only on this signature being honored.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, fd: &mut Fd, stats: &Stats) -> HandleResult;
}
