//! Perfect-square lookup table.

use alloc::vec::Vec;
use core::ops::Index;

/// Largest supported chain length.
///
/// Keeps every adjacent sum, and the overshooting square past it, inside a `u32`.
pub const MAX_N: usize = (u32::MAX / 4) as usize;

/// Ascending perfect squares `k²` for `k >= 2`, covering every sum of two
/// distinct values in `1..=n`.
///
/// The table stores squares up to and including the first one greater than
/// `2n - 1`. That overshooting entry is kept in storage but is not part of
/// the usable prefix, so [`len`](Self::len) is always `stored().len() - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareTable {
    entries: Vec<u32>,
    usable: usize,
}

impl SquareTable {
    /// Builds the table for chains of length `n`.
    ///
    /// `n` must not exceed [`MAX_N`]; callers validate it beforehand.
    pub fn new(n: usize) -> SquareTable {
        debug_assert!(n <= MAX_N);
        let max_sum = (2 * n as u64).saturating_sub(1);

        let mut entries = Vec::new();
        let mut k = 2u64;
        loop {
            let square = k * k;
            entries.push(square as u32);
            if square > max_sum {
                break;
            }
            k += 1;
        }

        let usable = entries.len() - 1;
        SquareTable { entries, usable }
    }

    /// Returns the number of usable squares.
    #[inline]
    pub fn len(&self) -> usize {
        self.usable
    }

    /// Returns `true` if no square can be the sum of two values, i.e. `n < 3`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.usable == 0
    }

    /// Returns the usable squares in ascending order.
    #[inline]
    pub fn usable(&self) -> &[u32] {
        &self.entries[..self.usable]
    }

    /// Returns every stored square, including the trailing overshoot.
    #[inline]
    pub fn stored(&self) -> &[u32] {
        &self.entries
    }

    /// Returns the `j`th usable square, or `None` past the usable prefix.
    #[inline]
    pub fn get(&self, j: usize) -> Option<u32> {
        self.usable().get(j).copied()
    }
}

impl Index<usize> for SquareTable {
    type Output = u32;

    /// # Panics
    ///
    /// Panics if `j` is outside the usable prefix.
    #[inline]
    fn index(&self, j: usize) -> &u32 {
        &self.usable()[j]
    }
}
