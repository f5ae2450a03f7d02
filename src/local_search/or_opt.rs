//! Chain relocation: relocate (single node) and Or-opt (short chains).
//!
//! # Algorithm
//!
//! Remove the chain `[p1 .. pk]` sitting between `u` and `v`, close the gap
//! with `(u -> v)`, and splice the chain into another edge `(x -> y)` whose
//! ends both lie outside it, either as `x -> p1 .. pk -> y` or reversed as
//! `x -> pk .. p1 -> y`:
//!
//! ```text
//! gain = d(u, p1) + d(pk, v) - d(u, v)
//!      + d(x, y) - d(x, p1) - d(pk, y)             (forward)
//!      + d(x, y) - d(x, pk) - d(p1, y) + fwd - bwd (reversed)
//! ```
//!
//! where `fwd`/`bwd` are the chain's internal cost in each direction.
//!
//! # Complexity
//!
//! O(n² × k) candidates per step for chains up to length k.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use std::ops::Range;

use super::neighborhood::{cost, keep_best, Candidate, Neighborhood};
use crate::distance::{CostMatrix, Gain};
use crate::tour::{RankPartition, RankSnapshot, Tour};

/// Move the chain `first .. last` (`len` nodes) from between `u` and `v` to
/// between `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChainMove {
    u: usize,
    first: usize,
    last: usize,
    v: usize,
    len: usize,
    x: usize,
    y: usize,
    reversed: bool,
}

/// Chain relocation over a range of chain lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChainRelocation {
    min_len: usize,
    max_len: usize,
    reversible: bool,
}

impl ChainRelocation {
    /// Single-node relocation.
    pub(crate) fn relocate() -> Self {
        Self {
            min_len: 1,
            max_len: 1,
            reversible: false,
        }
    }

    /// Chains of `2..=max_len` nodes, both orientations.
    pub(crate) fn or_opt(max_len: usize) -> Self {
        Self {
            min_len: 2,
            max_len: max_len.max(2),
            reversible: true,
        }
    }

    /// Walks the chain on the live tour; `None` if it no longer runs from
    /// `first` to `last` in `len` nodes.
    fn chain_on(tour: &Tour, mv: &ChainMove) -> Option<Vec<usize>> {
        let mut chain = Vec::with_capacity(mv.len);
        let mut cur = mv.first;
        chain.push(cur);
        for _ in 1..mv.len {
            cur = tour.next(cur);
            chain.push(cur);
        }
        (cur == mv.last).then_some(chain)
    }
}

/// Internal cost of `chain` travelled forwards and backwards.
fn internal_costs(matrix: &CostMatrix, chain: impl Iterator<Item = usize>) -> (Gain, Gain) {
    let mut forward = 0;
    let mut backward = 0;
    let mut prev = None;
    for loc in chain {
        if let Some(p) = prev {
            forward += cost(matrix, p, loc);
            backward += cost(matrix, loc, p);
        }
        prev = Some(loc);
    }
    (forward, backward)
}

impl Neighborhood for ChainRelocation {
    type Move = ChainMove;

    fn name(&self) -> &'static str {
        if self.max_len == 1 {
            "relocate"
        } else {
            "or_opt"
        }
    }

    fn rank_limits<'p>(&self, partition: &'p RankPartition) -> &'p [usize] {
        partition.limits()
    }

    fn best_move(
        &self,
        matrix: &CostMatrix,
        snapshot: &RankSnapshot,
        ranks: Range<usize>,
    ) -> Option<Candidate<ChainMove>> {
        let n = snapshot.len();
        let mut best = None;

        for i in ranks {
            for len in self.min_len..=self.max_len {
                // At least one edge must remain outside the chain.
                if n < len + 2 {
                    break;
                }
                let u = snapshot.at(i + n - 1);
                let first = snapshot.at(i);
                let last = snapshot.at(i + len - 1);
                let v = snapshot.at(i + len);

                let removal = cost(matrix, u, first) + cost(matrix, last, v) - cost(matrix, u, v);
                let (forward, backward) = if self.reversible {
                    internal_costs(matrix, (i..i + len).map(|r| snapshot.at(r)))
                } else {
                    (0, 0)
                };

                // Edges from (v -> ..) up to (.. -> u).
                for t in 0..(n - len - 1) {
                    let x = snapshot.at(i + len + t);
                    let y = snapshot.at(i + len + t + 1);
                    let xy = cost(matrix, x, y);
                    let mut mv = ChainMove {
                        u,
                        first,
                        last,
                        v,
                        len,
                        x,
                        y,
                        reversed: false,
                    };

                    let gain = removal + xy - cost(matrix, x, first) - cost(matrix, last, y);
                    keep_best(&mut best, mv, gain);

                    if self.reversible {
                        let gain = removal + xy - cost(matrix, x, last) - cost(matrix, first, y)
                            + forward
                            - backward;
                        mv.reversed = true;
                        keep_best(&mut best, mv, gain);
                    }
                }
            }
        }
        best
    }

    fn gain_on(&self, matrix: &CostMatrix, tour: &Tour, mv: &ChainMove) -> Option<Gain> {
        if tour.next(mv.u) != mv.first || tour.next(mv.last) != mv.v || tour.next(mv.x) != mv.y {
            return None;
        }
        let chain = Self::chain_on(tour, mv)?;
        if [mv.u, mv.v, mv.x, mv.y].iter().any(|loc| chain.contains(loc)) {
            return None;
        }

        let removal = cost(matrix, mv.u, mv.first) + cost(matrix, mv.last, mv.v)
            - cost(matrix, mv.u, mv.v);
        let xy = cost(matrix, mv.x, mv.y);
        let gain = if mv.reversed {
            let (forward, backward) = internal_costs(matrix, chain.iter().copied());
            removal + xy - cost(matrix, mv.x, mv.last) - cost(matrix, mv.first, mv.y) + forward
                - backward
        } else {
            removal + xy - cost(matrix, mv.x, mv.first) - cost(matrix, mv.last, mv.y)
        };
        Some(gain)
    }

    fn apply(&self, tour: &mut Tour, mv: &ChainMove) {
        let reversed_chain = mv.reversed.then(|| Self::chain_on(tour, mv)).flatten();

        tour.set_next(mv.u, mv.v);
        match reversed_chain {
            Some(chain) => {
                tour.set_next(mv.x, mv.last);
                for pair in chain.windows(2) {
                    tour.set_next(pair[1], pair[0]);
                }
                tour.set_next(mv.first, mv.y);
            }
            None => {
                tour.set_next(mv.x, mv.first);
                tour.set_next(mv.last, mv.y);
            }
        }
    }
}
