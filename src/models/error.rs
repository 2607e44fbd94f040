//! Error taxonomy for the load balancer.
//!
//! A single [`LbError`] threads through configuration loading, selector
//! mutation, connection establishment and session I/O, mirroring the way
//! the gateway this crate grew out of centers every fallible layer on one
//! `thiserror` enum.

use thiserror::Error;

/// Errors raised anywhere in the load balancer core.
#[derive(Debug, Error)]
pub enum LbError {
    /// Configuration is missing a required field or has an ill-typed one.
    #[error("configuration error: {0}")]
    Config(String),

    /// A URL string did not match the accepted grammar.
    #[error("malformed url: {0}")]
    MalformedUrl(String),

    /// A URL had no port and its scheme has no default port mapping.
    #[error("unknown protocol, specify port manually: {0}")]
    UnknownProtocol(String),

    /// A consistent-hash ring has no physical backends to select from.
    #[error("consistent hash ring is empty")]
    EmptyRing,

    /// An `excludeBackend` call would have left the selector with zero
    /// backends; the call is rejected and the selector keeps its prior set.
    #[error("cannot exclude the last remaining backend")]
    AllBackendsExcluded,

    /// The chosen backend actively refused the connection attempt.
    #[error("connection refused by backend")]
    ConnectionRefused,

    /// Any other connect-time failure (not a refusal).
    #[error("connect failed: {0}")]
    Connect(String),

    /// The session's underlying sockets produced an I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Shutdown was requested while the operation was in flight.
    #[error("cancelled")]
    Cancelled,
}

impl LbError {
    /// True for the "expected" terminal conditions that spec.md §7 says
    /// should be logged at debug level rather than surfaced as errors:
    /// client/backend EOF and executor-initiated cancellation.
    pub fn is_expected_teardown(&self) -> bool {
        match self {
            LbError::Cancelled => true,
            LbError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}
