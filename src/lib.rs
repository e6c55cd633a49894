//! # squarechain
//!
//! Exhaustive search for square-sum chains: orderings of `1..=n` in which
//! every pair of neighbours adds up to a perfect square.
//!
//! The search places values depth-first, trying the next value as
//! `square - previous` for each usable square in ascending order, and backs
//! out as soon as a value is out of range or already used. Chains therefore
//! come out in lexicographic order.
//!
//! ## Examples
//!
//! Collect every chain of length 15:
//!
//! ```
//! use squarechain::Engine;
//!
//! let mut engine = Engine::new(15).unwrap();
//! let mut chains = Vec::new();
//! engine.run(|chain| chains.push(chain.to_vec()));
//!
//! assert_eq!(chains.len(), 2);
//! assert_eq!(chains[0], [8, 1, 15, 10, 6, 3, 13, 12, 4, 5, 11, 14, 2, 7, 9]);
//! ```
//!
//! The sink may stop the search early:
//!
//! ```
//! use std::ops::ControlFlow;
//! use squarechain::Engine;
//!
//! let mut engine = Engine::new(squarechain::SMALL).unwrap();
//! let mut first = Vec::new();
//! let summary = engine.try_run(|chain| {
//!     first.extend_from_slice(chain);
//!     ControlFlow::Break(())
//! });
//!
//! assert!(summary.stopped);
//! assert_eq!(first.len(), 34);
//! assert_eq!(first[..4], [1, 3, 6, 19]);
//! ```

#![no_std]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

pub mod error;
pub mod search;
pub mod squares;
pub mod used;

use core::ops::ControlFlow;

pub use error::{Error, Result};
pub use search::{Chains, Search, Summary, RECURSION_LIMIT};
pub use squares::{SquareTable, MAX_N};
use used::UsedSet;
pub use used::{Bits, Word};

/// Chain length of the small preset.
pub const SMALL: usize = 34;

/// Chain length of the large preset.
pub const LARGE: usize = 43;

/// A search whose used-set representation is picked from `n`.
///
/// Lengths that fit in a machine word use [`Word`]; longer ones use [`Bits`].
#[derive(Debug, Clone)]
pub enum Engine {
    /// Search backed by a single `u64`.
    Word(Search<Word>),
    /// Search backed by a growable bit vector.
    Bits(Search<Bits>),
}

macro_rules! dispatch {
    ($engine:expr, $s:ident => $body:expr) => {
        match $engine {
            Engine::Word($s) => $body,
            Engine::Bits($s) => $body,
        }
    };
}

impl Engine {
    /// Creates a search for chains of length `n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if `n` is zero and [`Error::Capacity`] if `n`
    /// exceeds [`MAX_N`].
    pub fn new(n: usize) -> Result<Engine> {
        match Word::CAPACITY {
            Some(capacity) if n <= capacity => Search::new(n).map(Engine::Word),
            _ => Search::new(n).map(Engine::Bits),
        }
    }

    /// Returns the chain length.
    #[inline]
    pub fn n(&self) -> usize {
        dispatch!(self, s => s.n())
    }

    /// Returns the square table driving the search.
    #[inline]
    pub fn squares(&self) -> &SquareTable {
        dispatch!(self, s => s.squares())
    }

    /// See [`Search::set_node_limit`].
    #[inline]
    pub fn set_node_limit(&mut self, limit: Option<u64>) {
        dispatch!(self, s => s.set_node_limit(limit))
    }

    /// Returns `true` if no value is marked used.
    #[inline]
    pub fn is_idle(&self) -> bool {
        dispatch!(self, s => s.used().is_empty())
    }

    /// See [`Search::run`].
    pub fn run(&mut self, sink: impl FnMut(&[u32])) -> Summary {
        dispatch!(self, s => s.run(sink))
    }

    /// See [`Search::try_run`].
    pub fn try_run(&mut self, sink: impl FnMut(&[u32]) -> ControlFlow<()>) -> Summary {
        dispatch!(self, s => s.try_run(sink))
    }

    /// See [`Search::run_from`].
    pub fn run_from(&mut self, start: u32, sink: impl FnMut(&[u32])) -> Result<Summary> {
        dispatch!(self, s => s.run_from(start, sink))
    }

    /// See [`Search::try_run_from`].
    pub fn try_run_from(
        &mut self,
        start: u32,
        sink: impl FnMut(&[u32]) -> ControlFlow<()>,
    ) -> Result<Summary> {
        dispatch!(self, s => s.try_run_from(start, sink))
    }

    /// Walks chains with the explicit-stack walker, passing each to `sink`.
    ///
    /// Produces the same chains in the same order as [`try_run`](Self::try_run).
    pub fn try_walk(&mut self, mut sink: impl FnMut(&[u32]) -> ControlFlow<()>) -> Summary {
        dispatch!(self, s => s.chains().drive(&mut sink))
    }
}
