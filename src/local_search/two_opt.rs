//! 2-opt segment reversal, for symmetric and asymmetric matrices.
//!
//! # Algorithm
//!
//! Pick two non-adjacent edges `(a -> b)` and `(c -> d)`, with `c` reached
//! from `b` before `a`. Replace them by `(a -> c)` and `(b -> d)`, reversing
//! the chain `b -> .. -> c`:
//!
//! ```text
//! gain = d(a, b) + d(c, d) - d(a, c) - d(b, d)
//! ```
//!
//! On an asymmetric matrix every edge inside the reversed chain is now
//! travelled backwards, so the asymmetric evaluation also adds the chain's
//! forward cost and subtracts its backward cost. Both sums are carried
//! along the sweep over `c`, keeping each candidate O(1).
//!
//! # Complexity
//!
//! O(n²) candidates per step; committing a move is O(segment length).
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use std::ops::Range;

use super::neighborhood::{cost, keep_best, Candidate, Neighborhood};
use crate::distance::{CostMatrix, Gain};
use crate::tour::{RankPartition, RankSnapshot, Tour};

/// Edges `(a -> b)` and `(c -> d)` to be exchanged for `(a -> c)` and
/// `(b -> d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TwoOptMove {
    a: usize,
    b: usize,
    c: usize,
    d: usize,
}

impl TwoOptMove {
    fn still_valid(&self, tour: &Tour) -> bool {
        tour.next(self.a) == self.b
            && tour.next(self.c) == self.d
            && self.a != self.c
            && self.b != self.c
            && self.d != self.a
    }

    fn endpoint_gain(&self, matrix: &CostMatrix) -> Gain {
        cost(matrix, self.a, self.b) + cost(matrix, self.c, self.d)
            - cost(matrix, self.a, self.c)
            - cost(matrix, self.b, self.d)
    }

    /// Reverses `b -> .. -> c` in place and reconnects both ends.
    fn apply(&self, tour: &mut Tour) {
        let mut prev = self.d;
        let mut cur = self.b;
        loop {
            let succ = tour.next(cur);
            tour.set_next(cur, prev);
            if cur == self.c {
                break;
            }
            prev = cur;
            cur = succ;
        }
        tour.set_next(self.a, self.c);
    }
}

/// Symmetric evaluation: only the four endpoints matter.
///
/// Scans pairs of ranks `i < j` only, split by the symmetric rank limits,
/// so a pair and its mirror image are never both considered.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SymmetricTwoOpt;

impl Neighborhood for SymmetricTwoOpt {
    type Move = TwoOptMove;

    fn name(&self) -> &'static str {
        "two_opt"
    }

    fn rank_limits<'p>(&self, partition: &'p RankPartition) -> &'p [usize] {
        partition.sym_two_opt_limits()
    }

    fn best_move(
        &self,
        matrix: &CostMatrix,
        snapshot: &RankSnapshot,
        ranks: Range<usize>,
    ) -> Option<Candidate<TwoOptMove>> {
        let n = snapshot.len();
        let mut best = None;
        if n < 4 {
            return best;
        }

        for i in ranks {
            let a = snapshot.at(i);
            let b = snapshot.at(i + 1);
            let ab = cost(matrix, a, b);
            // (0, n - 1) shares location at(0) between both edges.
            let end = if i == 0 { n - 1 } else { n };
            for j in (i + 2)..end {
                let c = snapshot.at(j);
                let d = snapshot.at(j + 1);
                let gain = ab + cost(matrix, c, d) - cost(matrix, a, c) - cost(matrix, b, d);
                keep_best(&mut best, TwoOptMove { a, b, c, d }, gain);
            }
        }
        best
    }

    fn gain_on(&self, matrix: &CostMatrix, tour: &Tour, mv: &TwoOptMove) -> Option<Gain> {
        mv.still_valid(tour).then(|| mv.endpoint_gain(matrix))
    }

    fn apply(&self, tour: &mut Tour, mv: &TwoOptMove) {
        mv.apply(tour);
    }
}

/// Direction-aware evaluation for asymmetric matrices.
///
/// Every first edge is paired with every non-adjacent second edge further
/// along the cycle, so both ways of reversing a pair are evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AsymmetricTwoOpt;

impl Neighborhood for AsymmetricTwoOpt {
    type Move = TwoOptMove;

    fn name(&self) -> &'static str {
        "asym_two_opt"
    }

    fn rank_limits<'p>(&self, partition: &'p RankPartition) -> &'p [usize] {
        partition.limits()
    }

    fn best_move(
        &self,
        matrix: &CostMatrix,
        snapshot: &RankSnapshot,
        ranks: Range<usize>,
    ) -> Option<Candidate<TwoOptMove>> {
        let n = snapshot.len();
        let mut best = None;
        if n < 4 {
            return best;
        }

        for i in ranks {
            let a = snapshot.at(i);
            let b = snapshot.at(i + 1);
            let ab = cost(matrix, a, b);
            // Cost of b -> .. -> c travelled forwards and backwards.
            let mut forward = 0;
            let mut backward = 0;
            for offset in 2..=(n - 2) {
                let before_c = snapshot.at(i + offset - 1);
                let c = snapshot.at(i + offset);
                let d = snapshot.at(i + offset + 1);
                forward += cost(matrix, before_c, c);
                backward += cost(matrix, c, before_c);

                let gain = ab + cost(matrix, c, d) - cost(matrix, a, c) - cost(matrix, b, d)
                    + forward
                    - backward;
                keep_best(&mut best, TwoOptMove { a, b, c, d }, gain);
            }
        }
        best
    }

    fn gain_on(&self, matrix: &CostMatrix, tour: &Tour, mv: &TwoOptMove) -> Option<Gain> {
        if !mv.still_valid(tour) {
            return None;
        }
        let mut forward = 0;
        let mut backward = 0;
        let mut cur = mv.b;
        while cur != mv.c {
            let succ = tour.next(cur);
            if succ == mv.a {
                return None;
            }
            forward += cost(matrix, cur, succ);
            backward += cost(matrix, succ, cur);
            cur = succ;
        }
        Some(mv.endpoint_gain(matrix) + forward - backward)
    }

    fn apply(&self, tour: &mut Tour, mv: &TwoOptMove) {
        mv.apply(tour);
    }
}
