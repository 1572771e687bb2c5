//! Router error types.

use thiserror::Error;

/// Errors raised by table construction, lookups and packet construction.
///
/// A lookup that matches no route is not an error; it resolves to
/// [`DEFAULT_GATEWAY`](crate::routing::DEFAULT_GATEWAY).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A route prefix is not `a.b.c.d/n` with `n` in `0..=32`.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// A destination is not a dotted-quad IPv4 address.
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    /// A packet priority is outside `0..=2`.
    #[error("Invalid priority {0}, expected 0 (high) to 2 (low)")]
    InvalidPriority(u8),
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
