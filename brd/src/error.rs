//! Fatal transport errors and the static-file handler's HTTP status codes.
//!
//! Mirrors the teacher's `errors::ErrorKind` shape (a flat enum implementing
//! `std::error::Error`) rather than reaching for `anyhow`/`thiserror`: both
//! error surfaces here are small, closed sets known at compile time.

use std::{fmt, io};

/// Transport-level failure the dispatcher cannot recover from: bind, accept,
/// or the clock going backwards. The process logs and exits with code 1,
/// matching the C server's `DO_SYS` macro (`perror` + `exit(1)`).
#[derive(Debug)]
pub(crate) enum DispatchError {
    Bind(io::Error),
    Accept(io::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(err) => write!(f, "failed to bind listening socket: {err}"),
            Self::Accept(err) => write!(f, "accept() failed: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// The status a handler reports back to the worker. `Static`/`Dynamic` drive
/// the `Stat-Thread-Static`/`Stat-Thread-Dynamic` counters (§6.1); `Error`
/// carries a status line and is counted in `total` but neither counter, per
/// the worker contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    Static,
    Dynamic,
    Error(StatusCode),
}

/// The only status codes the handler contract names: `-501`, `-404`, `-403`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    NotImplemented,
    NotFound,
    Forbidden,
}

impl StatusCode {
    pub(crate) const fn line(self) -> &'static str {
        match self {
            Self::NotImplemented => "501 Not Implemented",
            Self::NotFound => "404 Not Found",
            Self::Forbidden => "403 Forbidden",
        }
    }

    pub(crate) const fn reason(self) -> &'static str {
        match self {
            Self::NotImplemented => "brd does not implement this method",
            Self::NotFound => "brd could not find this file",
            Self::Forbidden => "brd could not read this file",
        }
    }
}
