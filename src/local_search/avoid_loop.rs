//! Sub-cycle repair.
//!
//! Swapping the successors of `a` and `b` taken from two different cycles
//! splices them into one:
//!
//! ```text
//! a -> na ... a   +   b -> nb ... b   =>   a -> nb ... b -> na ... a
//! gain = d(a, na) + d(b, nb) - d(a, nb) - d(b, na)
//! ```
//!
//! The pair with the largest gain (smallest cost increase) is chosen. The
//! gain is usually negative: the repair restores a single Hamiltonian
//! cycle, it does not improve the tour.

use rayon::prelude::*;
use rayon::ThreadPool;

use super::neighborhood::cost;
use crate::distance::{CostMatrix, Gain};
use crate::tour::{even_limits, Tour};

/// Swap of `next[a]` (main cycle) and `next[b]` (sub-cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoopMerge {
    pub a: usize,
    pub b: usize,
    pub gain: Gain,
}

/// Cheapest way to merge the first sub-cycle into the cycle through
/// location 0, or `None` if the tour is already one cycle.
///
/// Main-cycle locations are split into `nb_threads` chunks scanned on
/// `pool`.
pub(crate) fn best_merge(
    matrix: &CostMatrix,
    tour: &Tour,
    pool: &ThreadPool,
    nb_threads: usize,
) -> Option<LoopMerge> {
    let cycles = tour.cycles();
    // Cycles are ordered by their lowest location: the first one holds 0.
    let (main, sub) = match cycles.as_slice() {
        [main, sub, ..] => (main, sub),
        _ => return None,
    };

    let limits = even_limits(main.len(), nb_threads.max(1));
    let winners: Vec<Option<LoopMerge>> = pool.install(|| {
        limits
            .par_windows(2)
            .map(|w| scan(matrix, tour, &main[w[0]..w[1]], sub))
            .collect()
    });

    winners.into_iter().flatten().fold(None, |best, cur| match best {
        Some(b) if b.gain >= cur.gain => Some(b),
        _ => Some(cur),
    })
}

fn scan(matrix: &CostMatrix, tour: &Tour, mains: &[usize], sub: &[usize]) -> Option<LoopMerge> {
    let mut best: Option<LoopMerge> = None;
    for &a in mains {
        let na = tour.next(a);
        let a_edge = cost(matrix, a, na);
        for &b in sub {
            let nb = tour.next(b);
            let gain = a_edge + cost(matrix, b, nb) - cost(matrix, a, nb) - cost(matrix, b, na);
            if best.is_none_or(|m| gain > m.gain) {
                best = Some(LoopMerge { a, b, gain });
            }
        }
    }
    best
}

/// Swaps the two successor pointers.
pub(crate) fn apply(tour: &mut Tour, merge: &LoopMerge) {
    let na = tour.next(merge.a);
    let nb = tour.next(merge.b);
    tour.set_next(merge.a, nb);
    tour.set_next(merge.b, na);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(threads: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("pool")
    }

    fn line(n: usize) -> CostMatrix {
        let points: Vec<(f64, f64)> = (0..n).map(|i| (10.0 * i as f64, 0.0)).collect();
        CostMatrix::from_coordinates(&points)
    }

    #[test]
    fn test_single_cycle_needs_no_merge() {
        let dm = line(4);
        let tour = Tour::from_sequence(&[0, 1, 2, 3]).expect("valid");
        assert!(best_merge(&dm, &tour, &pool(2), 2).is_none());
    }

    #[test]
    fn test_merges_two_triangles() {
        let dm = line(6);
        let mut tour = Tour::from_successors(vec![1, 2, 0, 4, 5, 3]).expect("permutation");
        assert_eq!(tour.cost(&dm), 80);

        let merge = best_merge(&dm, &tour, &pool(2), 3).expect("two cycles");
        assert_eq!(merge.gain, -20);

        apply(&mut tour, &merge);
        assert!(tour.is_single_cycle());
        assert_eq!(tour.cost(&dm), 100);
    }

    #[test]
    fn test_merges_self_loop() {
        let dm = line(3);
        // 2 points to itself.
        let mut tour = Tour::from_successors(vec![1, 0, 2]).expect("permutation");
        let merge = best_merge(&dm, &tour, &pool(1), 1).expect("two cycles");
        apply(&mut tour, &merge);
        assert!(tour.is_single_cycle());
        assert_eq!(tour.cost(&dm), 40);
        assert_eq!(merge.gain, 20 - 40);
    }

    #[test]
    fn test_thread_count_does_not_change_choice() {
        let dm = line(8);
        let tour = Tour::from_successors(vec![3, 0, 1, 2, 6, 4, 5, 7]).expect("permutation");
        let single = best_merge(&dm, &tour, &pool(1), 1);
        let many = best_merge(&dm, &tour, &pool(3), 5);
        assert_eq!(single, many);
    }
}
