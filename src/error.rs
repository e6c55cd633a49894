//! Configuration errors.

use thiserror::Error;

/// Errors raised while validating a search before it starts.
///
/// The search itself has no failure modes: a dead end is ordinary backtracking.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The chain length was zero.
    #[error("chain length must be at least 1")]
    Empty,

    /// The chain length does not fit the used-set representation.
    #[error("chain length {n} exceeds the capacity of {capacity}")]
    Capacity {
        /// Requested chain length.
        n: usize,
        /// Largest length the representation can hold.
        capacity: usize,
    },

    /// A starting value outside `1..=n`.
    #[error("starting value {start} is outside 1..={n}")]
    Start {
        /// Requested starting value.
        start: u32,
        /// Chain length of the search.
        n: usize,
    },
}

/// Result alias for configuration checks.
pub type Result<T> = core::result::Result<T, Error>;
