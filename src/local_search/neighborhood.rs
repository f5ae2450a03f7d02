//! Move-evaluation contract shared by every improvement family.

use std::fmt::Debug;
use std::ops::Range;

use crate::distance::{CostMatrix, Gain};
use crate::tour::{RankPartition, RankSnapshot, Tour};

/// A move found by one worker, with its gain at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate<M> {
    pub mv: M,
    pub gain: Gain,
}

/// One family of improving moves.
///
/// The engine scans disjoint rank ranges in parallel with
/// [`best_move`](Self::best_move), then commits the winners one at a time on
/// the calling thread. Because an earlier commit can invalidate a later
/// winner, each winner goes through [`gain_on`](Self::gain_on) against the
/// live tour before [`apply`](Self::apply).
pub(crate) trait Neighborhood: Sync {
    type Move: Copy + Send + Debug;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Which partition table splits this family's scan.
    fn rank_limits<'p>(&self, partition: &'p RankPartition) -> &'p [usize];

    /// Best strictly improving move whose first rank lies in `ranks`.
    /// Ties keep the move scanned first.
    fn best_move(
        &self,
        matrix: &CostMatrix,
        snapshot: &RankSnapshot,
        ranks: Range<usize>,
    ) -> Option<Candidate<Self::Move>>;

    /// Gain of `mv` on the current tour, or `None` if the edges it relies on
    /// are gone.
    fn gain_on(&self, matrix: &CostMatrix, tour: &Tour, mv: &Self::Move) -> Option<Gain>;

    /// Rewrites the successor pointers. Only called after `gain_on`
    /// returned `Some` for the same tour.
    fn apply(&self, tour: &mut Tour, mv: &Self::Move);
}

#[inline]
pub(crate) fn cost(matrix: &CostMatrix, from: usize, to: usize) -> Gain {
    Gain::from(matrix.get(from, to))
}

/// Replaces `best` when `gain` is positive and strictly larger.
#[inline]
pub(crate) fn keep_best<M>(best: &mut Option<Candidate<M>>, mv: M, gain: Gain) {
    if gain > best.as_ref().map_or(0, |b| b.gain) {
        *best = Some(Candidate { mv, gain });
    }
}
