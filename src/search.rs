//! Depth-first chain search.

use alloc::{vec, vec::Vec};
use core::{iter::FusedIterator, ops::ControlFlow};

use crate::{
    error::{Error, Result},
    squares::{SquareTable, MAX_N},
    used::UsedSet,
};

/// Longest chain searched by recursion.
///
/// Recursion goes one frame deeper per position, so longer chains are walked
/// with [`Chains`] instead. The order of chains is the same either way.
pub const RECURSION_LIMIT: usize = 1024;

/// Counters reported by a finished or stopped search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Chains handed to the sink.
    pub solutions: u64,
    /// Values placed on the search path, starting values included.
    pub nodes: u64,
    /// Whether the sink ended the search early.
    pub stopped: bool,
    /// Whether the node limit ended the search early.
    pub truncated: bool,
}

/// A search context for square-sum chains of length `n`.
///
/// Owns the working sequence, the used-set and the square table. All three
/// are allocated once in [`new`](Self::new) and restored to their initial
/// state whenever a search returns, so a context can be run repeatedly.
#[derive(Debug, Clone)]
pub struct Search<U> {
    sequence: Vec<u32>,
    used: U,
    squares: SquareTable,
    node_limit: Option<u64>,
}

impl<U: UsedSet> Search<U> {
    /// Creates a search for chains of length `n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if `n` is zero, and [`Error::Capacity`] if `n`
    /// exceeds [`MAX_N`] or the capacity of `U`.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::Empty);
        }
        if n > MAX_N {
            return Err(Error::Capacity { n, capacity: MAX_N });
        }
        Ok(Search {
            sequence: vec![0; n],
            used: U::with_len(n)?,
            squares: SquareTable::new(n),
            node_limit: None,
        })
    }

    /// Returns the chain length.
    #[inline]
    pub fn n(&self) -> usize {
        self.sequence.len()
    }

    /// Returns the square table driving the search.
    #[inline]
    pub fn squares(&self) -> &SquareTable {
        &self.squares
    }

    /// Returns the used-set. It is empty whenever no search is in progress.
    #[inline]
    pub fn used(&self) -> &U {
        &self.used
    }

    /// Returns the node limit, if any.
    #[inline]
    pub fn node_limit(&self) -> Option<u64> {
        self.node_limit
    }

    /// Caps the number of values a single search may place.
    ///
    /// A search that reaches the cap returns with [`Summary::truncated`] set.
    /// `None`, the default, searches exhaustively.
    #[inline]
    pub fn set_node_limit(&mut self, limit: Option<u64>) {
        self.node_limit = limit;
    }

    /// Walks every chain, passing each one to `sink`.
    ///
    /// Chains arrive ordered by starting value, then by ascending square at
    /// each later position.
    pub fn run(&mut self, mut sink: impl FnMut(&[u32])) -> Summary {
        self.try_run(|chain| {
            sink(chain);
            ControlFlow::Continue(())
        })
    }

    /// Like [`run`](Self::run), but stops as soon as `sink` breaks.
    pub fn try_run(&mut self, mut sink: impl FnMut(&[u32]) -> ControlFlow<()>) -> Summary {
        if self.n() > RECURSION_LIMIT {
            return self.chains().drive(&mut sink);
        }

        let mut summary = Summary::default();
        for start in 1..=self.n() as u32 {
            if self.descend_from(start, &mut sink, &mut summary).is_break() {
                summary.stopped = !summary.truncated;
                break;
            }
        }
        summary
    }

    /// Walks every chain beginning with `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Start`] if `start` is not in `1..=n`.
    pub fn run_from(&mut self, start: u32, mut sink: impl FnMut(&[u32])) -> Result<Summary> {
        self.try_run_from(start, |chain| {
            sink(chain);
            ControlFlow::Continue(())
        })
    }

    /// Like [`run_from`](Self::run_from), but stops as soon as `sink` breaks.
    pub fn try_run_from(
        &mut self,
        start: u32,
        mut sink: impl FnMut(&[u32]) -> ControlFlow<()>,
    ) -> Result<Summary> {
        if self.n() > RECURSION_LIMIT {
            return Ok(self.chains_from(start)?.drive(&mut sink));
        }

        self.check_start(start)?;
        let mut summary = Summary::default();
        let flow = self.descend_from(start, &mut sink, &mut summary);
        summary.stopped = flow.is_break() && !summary.truncated;
        Ok(summary)
    }

    /// Returns an explicit-stack walker over the same chains, in the same order.
    #[inline]
    pub fn chains(&mut self) -> Chains<'_, U> {
        let n = self.n();
        Chains::new(self, 0, n)
    }

    /// Returns a walker over the chains beginning with `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Start`] if `start` is not in `1..=n`.
    pub fn chains_from(&mut self, start: u32) -> Result<Chains<'_, U>> {
        self.check_start(start)?;
        let first = start as usize - 1;
        Ok(Chains::new(self, first, first + 1))
    }

    fn check_start(&self, start: u32) -> Result<()> {
        if start == 0 || start as usize > self.n() {
            return Err(Error::Start {
                start,
                n: self.n(),
            });
        }
        Ok(())
    }

    /// Counts a placement, or reports that the node limit has been reached.
    #[inline]
    fn place(&self, summary: &mut Summary) -> bool {
        if self.node_limit.is_some_and(|limit| summary.nodes >= limit) {
            summary.truncated = true;
            return false;
        }
        summary.nodes += 1;
        true
    }

    fn descend_from<F>(&mut self, start: u32, sink: &mut F, summary: &mut Summary) -> ControlFlow<()>
    where
        F: FnMut(&[u32]) -> ControlFlow<()>,
    {
        if !self.place(summary) {
            return ControlFlow::Break(());
        }
        let i = start as usize - 1;
        self.sequence[0] = start;
        self.used.insert(i);
        let flow = self.backtrack(1, sink, summary);
        self.used.remove(i);
        flow
    }

    fn backtrack<F>(&mut self, depth: usize, sink: &mut F, summary: &mut Summary) -> ControlFlow<()>
    where
        F: FnMut(&[u32]) -> ControlFlow<()>,
    {
        if depth == self.n() {
            summary.solutions += 1;
            return sink(self.sequence.as_slice());
        }

        let mut from = 0;
        while let Some((resume, next)) = self.candidate(depth, from) {
            if !self.place(summary) {
                return ControlFlow::Break(());
            }
            from = resume;
            let i = next as usize - 1;
            self.sequence[depth] = next;
            self.used.insert(i);
            let flow = self.backtrack(depth + 1, sink, summary);
            // Cleared even when the subtree stopped the search.
            self.used.remove(i);
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }

    /// Finds the next value for position `depth >= 1`, scanning squares from
    /// index `from`.
    ///
    /// Returns the square index to resume from and the value.
    fn candidate(&self, depth: usize, from: usize) -> Option<(usize, u32)> {
        let n = self.n();
        // Signed: a square below the previous value gives a negative candidate.
        let prev = i64::from(self.sequence[depth - 1]);
        let squares = self.squares.usable();
        for (j, &square) in squares.iter().enumerate().skip(from) {
            let next = i64::from(square) - prev;
            if next <= 0 || next > n as i64 || self.used.contains(next as usize - 1) {
                continue;
            }
            return Some((j + 1, next as u32));
        }
        None
    }
}

/// Resumable search over chains, driven by an explicit stack of frames.
///
/// Frame `d` holds the next choice to try for position `d`: a starting-value
/// index for the first frame, a square index for the rest. Values are placed
/// and undone in the same order as [`Search::run`], so chains come out in the
/// same order. Dropping the walker early clears the used-set.
#[derive(Debug)]
pub struct Chains<'a, U: UsedSet> {
    search: &'a mut Search<U>,
    frames: Vec<usize>,
    starts_end: usize,
    full: bool,
    nodes: u64,
    truncated: bool,
}

impl<'a, U: UsedSet> Chains<'a, U> {
    fn new(search: &'a mut Search<U>, first: usize, starts_end: usize) -> Self {
        let mut frames = Vec::with_capacity(search.n());
        frames.push(first);
        Chains {
            search,
            frames,
            starts_end,
            full: false,
            nodes: 0,
            truncated: false,
        }
    }

    /// Returns the number of values placed so far.
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns `true` if the walk ended at the node limit.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Advances to the next chain and lends it, or returns `None` once the
    /// search space or the node limit is exhausted.
    pub fn next_chain(&mut self) -> Option<&[u32]> {
        let n = self.search.n();
        if self.full {
            self.full = false;
            let last = self.search.sequence[n - 1];
            self.search.used.remove(last as usize - 1);
        }

        while let Some(&from) = self.frames.last() {
            let depth = self.frames.len() - 1;
            let found = if depth == 0 {
                (from < self.starts_end).then(|| (from + 1, from as u32 + 1))
            } else {
                self.search.candidate(depth, from)
            };
            match found {
                Some((resume, next)) => {
                    if self.search.node_limit.is_some_and(|limit| self.nodes >= limit) {
                        self.truncated = true;
                        self.frames.clear();
                        self.search.used.clear();
                        return None;
                    }
                    self.frames[depth] = resume;
                    self.search.sequence[depth] = next;
                    self.search.used.insert(next as usize - 1);
                    self.nodes += 1;
                    if depth + 1 == n {
                        self.full = true;
                        return Some(self.search.sequence.as_slice());
                    }
                    self.frames.push(0);
                }
                None => {
                    self.frames.pop();
                    if depth > 0 {
                        let prev = self.search.sequence[depth - 1];
                        self.search.used.remove(prev as usize - 1);
                    }
                }
            }
        }
        None
    }

    /// Passes chains to `sink` until it breaks or the walk ends.
    pub(crate) fn drive<F>(mut self, sink: &mut F) -> Summary
    where
        F: FnMut(&[u32]) -> ControlFlow<()>,
    {
        let mut summary = Summary::default();
        while let Some(chain) = self.next_chain() {
            summary.solutions += 1;
            if sink(chain).is_break() {
                summary.stopped = true;
                break;
            }
        }
        summary.nodes = self.nodes;
        summary.truncated = self.truncated;
        summary
    }
}

impl<U: UsedSet> Iterator for Chains<'_, U> {
    type Item = Vec<u32>;

    #[inline]
    fn next(&mut self) -> Option<Vec<u32>> {
        self.next_chain().map(<[u32]>::to_vec)
    }
}

impl<U: UsedSet> FusedIterator for Chains<'_, U> {}

impl<U: UsedSet> Drop for Chains<'_, U> {
    fn drop(&mut self) {
        self.search.used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::used::{Bits, Word};

    fn is_square(x: u32) -> bool {
        let root = x.isqrt();
        root * root == x
    }

    fn collect<U: UsedSet>(n: usize) -> Vec<Vec<u32>> {
        let mut search = Search::<U>::new(n).unwrap();
        let mut out = Vec::new();
        search.run(|chain| out.push(chain.to_vec()));
        out
    }

    #[test]
    fn single_value() {
        let mut search = Search::<Word>::new(1).unwrap();
        let mut out = Vec::new();
        let summary = search.run(|chain| out.push(chain.to_vec()));
        assert_eq!(out, vec![vec![1]]);
        assert_eq!(summary.solutions, 1);
        assert!(!summary.stopped);
        assert!(search.used().is_empty());
    }

    #[test]
    fn fifteen() {
        let forward = vec![8, 1, 15, 10, 6, 3, 13, 12, 4, 5, 11, 14, 2, 7, 9];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(collect::<Word>(15), vec![forward, backward]);
    }

    #[test]
    fn chains_are_valid_permutations() {
        for n in [16, 17, 23] {
            let chains = collect::<Bits>(n);
            assert!(!chains.is_empty());
            for chain in chains {
                let mut sorted = chain.clone();
                sorted.sort_unstable();
                assert!(sorted.iter().copied().eq(1..=n as u32));
                assert!(chain.windows(2).all(|w| is_square(w[0] + w[1])));
            }
        }
    }

    #[test]
    fn used_set_restored() {
        let mut search = Search::<Word>::new(23).unwrap();
        assert!(search.used().is_empty());
        let summary = search.run(|_| {});
        assert_eq!(summary.solutions, 6);
        assert!(search.used().is_empty());

        // A second run sees identical state.
        assert_eq!(search.run(|_| {}), summary);
    }

    #[test]
    fn sink_stops_search() {
        let mut search = Search::<Word>::new(25).unwrap();
        let mut seen = 0;
        let summary = search.try_run(|_| {
            seen += 1;
            if seen == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 3);
        assert_eq!(summary.solutions, 3);
        assert!(summary.stopped);
        assert!(search.used().is_empty());
    }

    #[test]
    fn single_start() {
        let mut search = Search::<Word>::new(15).unwrap();
        let mut out = Vec::new();
        let summary = search.run_from(9, |chain| out.push(chain.to_vec())).unwrap();
        assert_eq!(summary.solutions, 1);
        assert_eq!(out[0][0], 9);

        let summary = search.run_from(1, |_| {}).unwrap();
        assert_eq!(summary.solutions, 0);
        assert!(search.used().is_empty());

        assert_eq!(
            search.run_from(16, |_| {}),
            Err(Error::Start { start: 16, n: 15 })
        );
        assert_eq!(
            search.run_from(0, |_| {}),
            Err(Error::Start { start: 0, n: 15 })
        );
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(Search::<Word>::new(0).unwrap_err(), Error::Empty);
        assert_eq!(
            Search::<Word>::new(65).unwrap_err(),
            Error::Capacity { n: 65, capacity: 64 }
        );
        assert!(Search::<Bits>::new(65).is_ok());
        assert_eq!(
            Search::<Bits>::new(MAX_N + 1).unwrap_err(),
            Error::Capacity {
                n: MAX_N + 1,
                capacity: MAX_N
            }
        );
    }

    #[test]
    fn walker_matches_recursion() {
        for n in [1, 3, 15, 17, 23, 25] {
            let mut search = Search::<Word>::new(n).unwrap();
            let mut expected = Vec::new();
            let summary = search.run(|chain| expected.push(chain.to_vec()));

            let mut chains = search.chains();
            let mut walked = Vec::new();
            while let Some(chain) = chains.next_chain() {
                walked.push(chain.to_vec());
            }
            assert_eq!(chains.nodes(), summary.nodes);
            drop(chains);

            assert_eq!(walked, expected);
            assert!(search.used().is_empty());
        }
    }

    #[test]
    fn walker_drop_clears() {
        let mut search = Search::<Bits>::new(25).unwrap();
        let first = search.chains().next();
        assert_eq!(first.as_deref(), Some(&collect::<Bits>(25)[0][..]));
        assert!(search.used().is_empty());

        let mut chains = search.chains();
        assert_eq!(chains.by_ref().count(), 20);
        assert_eq!(chains.next(), None);
    }

    #[test]
    fn walker_from_start() {
        let mut search = Search::<Word>::new(15).unwrap();
        let from_nine = search.chains_from(9).unwrap().collect::<Vec<_>>();
        assert_eq!(
            from_nine,
            vec![vec![9, 7, 2, 14, 11, 5, 4, 12, 13, 3, 6, 10, 15, 1, 8]]
        );
        assert_eq!(search.chains_from(1).unwrap().count(), 0);
        assert!(search.chains_from(16).is_err());
        assert!(search.used().is_empty());
    }

    #[test]
    fn long_chains_use_walker() {
        let n = RECURSION_LIMIT + 1;
        let mut search = Search::<Bits>::new(n).unwrap();
        search.set_node_limit(Some(20_000));

        let summary = search.try_run(|_| ControlFlow::Break(()));
        assert!(summary.truncated);
        assert_eq!(summary.nodes, 20_000);
        assert!(search.used().is_empty());

        let walked = search.chains().drive(&mut |_: &[u32]| ControlFlow::Break(()));
        assert_eq!(summary, walked);

        let from_two = search.try_run_from(2, |_| ControlFlow::Break(())).unwrap();
        assert!(from_two.truncated);
        assert!(search.used().is_empty());
    }

    #[test]
    fn node_limit_zero_places_nothing() {
        let mut search = Search::<Word>::new(15).unwrap();
        search.set_node_limit(Some(0));
        let summary = search.run(|_| {});
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.solutions, 0);
        assert!(summary.truncated);
        assert!(search.chains().next().is_none());
    }

    #[test]
    fn contexts_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Search<Word>>();
        assert_send::<Search<Bits>>();
    }
}
