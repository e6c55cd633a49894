//! Used-value sets.
//!
//! A used-set holds one bit per value `1..=n`; bit `i` is set iff value
//! `i + 1` is on the current search path. Two representations share the
//! [`UsedSet`] trait: [`Word`] packs everything into one `u64` and [`Bits`]
//! grows with `n`.

use bitvec::{order::Lsb0, vec::BitVec};

use crate::error::{Error, Result};

/// Trait for the bit storage behind a search.
///
/// Indexes are zero-based: index `i` stands for value `i + 1`.
pub trait UsedSet: internal::Sealed + Sized {
    /// Largest length this representation can track, if bounded.
    const CAPACITY: Option<usize>;

    /// Creates an empty set for values `1..=n`.
    ///
    /// Fails with [`Error::Capacity`] if `n` exceeds [`CAPACITY`](Self::CAPACITY).
    fn with_len(n: usize) -> Result<Self>;

    /// Returns `true` if index `i` is set.
    fn contains(&self, i: usize) -> bool;

    /// Sets index `i`.
    fn insert(&mut self, i: usize);

    /// Clears index `i`.
    fn remove(&mut self, i: usize);

    /// Returns `true` if no index is set.
    fn is_empty(&self) -> bool;

    /// Clears every index.
    fn clear(&mut self);
}

/// Fixed-width used-set stored in a single `u64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Word(u64);

impl Word {
    /// Returns the raw bits.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }
}

impl UsedSet for Word {
    const CAPACITY: Option<usize> = Some(u64::BITS as usize);

    #[inline]
    fn with_len(n: usize) -> Result<Self> {
        let capacity = u64::BITS as usize;
        if n > capacity {
            return Err(Error::Capacity { n, capacity });
        }
        Ok(Word(0))
    }

    #[inline]
    fn contains(&self, i: usize) -> bool {
        self.0 & (1 << i) != 0
    }

    #[inline]
    fn insert(&mut self, i: usize) {
        self.0 |= 1 << i;
    }

    #[inline]
    fn remove(&mut self, i: usize) {
        self.0 &= !(1 << i);
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Growable used-set backed by a `BitVec` of `n` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bits(BitVec<u64, Lsb0>);

impl UsedSet for Bits {
    const CAPACITY: Option<usize> = None;

    #[inline]
    fn with_len(n: usize) -> Result<Self> {
        Ok(Bits(BitVec::repeat(false, n)))
    }

    #[inline]
    fn contains(&self, i: usize) -> bool {
        self.0[i]
    }

    #[inline]
    fn insert(&mut self, i: usize) {
        self.0.set(i, true);
    }

    #[inline]
    fn remove(&mut self, i: usize) {
        self.0.set(i, false);
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    #[inline]
    fn clear(&mut self) {
        self.0.fill(false);
    }
}

mod internal {
    pub trait Sealed {}

    impl Sealed for super::Word {}
    impl Sealed for super::Bits {}
}
