//! The local search engine: tour ownership, worker pool and step
//! orchestration.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::avoid_loop;
use super::config::LocalSearchConfig;
use super::neighborhood::{Candidate, Neighborhood};
use super::or_opt::ChainRelocation;
use super::two_opt::{AsymmetricTwoOpt, SymmetricTwoOpt};
use crate::distance::{CostMatrix, Gain};
use crate::error::{LocalSearchError, Result};
use crate::tour::{RankPartition, RankSnapshot, Tour};

/// Location every rank snapshot starts from.
const REFERENCE_INDEX: usize = 0;

/// Parallel local search over a single TSP tour.
///
/// Each `*_step` method runs one sweep of one move family: the rank space
/// is split across the worker pool, every worker reports its best
/// improving move, and the winners are committed in region order on the
/// calling thread. A step returns the total gain it applied (0 when no
/// improving move exists). The `perform_all_*` methods repeat their step
/// until it returns 0.
///
/// # Examples
///
/// ```
/// use u_tour_opt::distance::CostMatrix;
/// use u_tour_opt::local_search::LocalSearch;
///
/// // Unit square visited in a crossing order.
/// let dm = CostMatrix::from_coordinates(&[
///     (0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0),
/// ]);
/// let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3], 2).unwrap();
///
/// let gain = ls.perform_all_two_opt_steps();
/// assert_eq!(gain, 8);
/// assert_eq!(ls.tour_cost(), 40);
/// ```
#[derive(Debug)]
pub struct LocalSearch<'a> {
    matrix: &'a CostMatrix,
    is_symmetric_matrix: bool,
    tour: Tour,
    partition: RankPartition,
    config: LocalSearchConfig,
    pool: ThreadPool,
}

impl<'a> LocalSearch<'a> {
    /// Builds an engine for `tour` over `matrix` with `nb_threads` workers
    /// and default settings otherwise.
    ///
    /// `is_symmetric_matrix` selects the 2-opt evaluation; pass `false`
    /// whenever `matrix.get(i, j)` may differ from `matrix.get(j, i)`.
    ///
    /// # Errors
    ///
    /// [`LocalSearchError::InvalidTour`] if `tour` is shorter than 2 or not a
    /// permutation; [`LocalSearchError::DimensionMismatch`] if its length
    /// differs from the matrix size.
    pub fn new(
        matrix: &'a CostMatrix,
        is_symmetric_matrix: bool,
        tour: &[usize],
        nb_threads: usize,
    ) -> Result<Self> {
        let config = LocalSearchConfig::default().with_nb_threads(nb_threads);
        Self::with_config(matrix, is_symmetric_matrix, tour, config)
    }

    /// Builds an engine with explicit settings.
    pub fn with_config(
        matrix: &'a CostMatrix,
        is_symmetric_matrix: bool,
        tour: &[usize],
        config: LocalSearchConfig,
    ) -> Result<Self> {
        let n = tour.len();
        if n < 2 {
            return Err(LocalSearchError::invalid_tour(format!(
                "a tour needs at least 2 locations, got {n}"
            )));
        }
        if n != matrix.size() {
            return Err(LocalSearchError::DimensionMismatch {
                matrix: matrix.size(),
                tour: n,
            });
        }
        let tour = Tour::from_sequence(tour)?;

        let config = LocalSearchConfig {
            nb_threads: config.nb_threads.max(1),
            or_opt_max_chain: config.or_opt_max_chain.max(2),
            ..config
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.nb_threads.min(n))
            .thread_name(|i| format!("tour-opt-{i}"))
            .build()?;

        log::debug!(
            "local_search: init n={n} threads={} symmetric={is_symmetric_matrix}",
            config.nb_threads
        );

        Ok(Self {
            matrix,
            is_symmetric_matrix,
            partition: RankPartition::new(n, config.nb_threads),
            tour,
            config,
            pool,
        })
    }

    /// One symmetric 2-opt sweep.
    ///
    /// On an engine built with `is_symmetric_matrix = false` this runs
    /// [`asym_two_opt_step`](Self::asym_two_opt_step) instead, since the
    /// endpoint-only gain would be wrong.
    ///
    /// # Panics
    ///
    /// Panics if the tour is split into sub-cycles (see
    /// [`avoid_loop_step`](Self::avoid_loop_step)). The same holds for every
    /// improvement step.
    pub fn two_opt_step(&mut self) -> Gain {
        if !self.is_symmetric_matrix {
            log::warn!("two_opt: matrix is asymmetric, using asym_two_opt");
            return self.run_step(&AsymmetricTwoOpt);
        }
        self.run_step(&SymmetricTwoOpt)
    }

    /// One direction-aware 2-opt sweep.
    pub fn asym_two_opt_step(&mut self) -> Gain {
        self.run_step(&AsymmetricTwoOpt)
    }

    /// One sweep relocating single locations.
    pub fn relocate_step(&mut self) -> Gain {
        self.run_step(&ChainRelocation::relocate())
    }

    /// One sweep relocating chains of 2 up to `or_opt_max_chain` locations,
    /// in either orientation.
    pub fn or_opt_step(&mut self) -> Gain {
        self.run_step(&ChainRelocation::or_opt(self.config.or_opt_max_chain))
    }

    /// Merges one sub-cycle into the cycle through location 0.
    ///
    /// Returns the signed gain of the merge, which is usually negative, or
    /// 0 if the tour already is a single cycle.
    pub fn avoid_loop_step(&mut self) -> Gain {
        self.merge_sub_cycle().unwrap_or(0)
    }

    /// Repeats [`two_opt_step`](Self::two_opt_step) until it finds nothing.
    pub fn perform_all_two_opt_steps(&mut self) -> Gain {
        if !self.is_symmetric_matrix {
            log::warn!("two_opt: matrix is asymmetric, using asym_two_opt");
            return self.perform_all_asym_two_opt_steps();
        }
        self.repeat(|ls| ls.run_step(&SymmetricTwoOpt))
    }

    /// Repeats [`asym_two_opt_step`](Self::asym_two_opt_step) until it finds
    /// nothing.
    pub fn perform_all_asym_two_opt_steps(&mut self) -> Gain {
        self.repeat(Self::asym_two_opt_step)
    }

    /// Repeats [`relocate_step`](Self::relocate_step) until it finds nothing.
    pub fn perform_all_relocate_steps(&mut self) -> Gain {
        self.repeat(Self::relocate_step)
    }

    /// Repeats [`or_opt_step`](Self::or_opt_step) until it finds nothing.
    pub fn perform_all_or_opt_steps(&mut self) -> Gain {
        self.repeat(Self::or_opt_step)
    }

    /// Merges sub-cycles until a single cycle remains; returns the summed
    /// (usually negative) gain.
    ///
    /// # Panics
    ///
    /// Panics if the tour is still split afterwards, which would be a bug
    /// in the merge.
    pub fn perform_all_avoid_loop_steps(&mut self) -> Gain {
        let mut total = 0;
        while let Some(gain) = self.merge_sub_cycle() {
            total += gain;
        }
        assert!(
            self.tour.is_single_cycle(),
            "avoid_loop: tour still split into {} cycles after repair",
            self.tour.cycles().len()
        );
        total
    }

    /// The tour as a sequence starting at `first_index`.
    ///
    /// # Panics
    ///
    /// Panics if `first_index` is not a location of the tour.
    pub fn get_tour(&self, first_index: usize) -> Vec<usize> {
        self.tour.sequence_from(first_index)
    }

    /// Overwrites the successor array directly.
    ///
    /// `next` must be a permutation of `0..n` but may describe several
    /// cycles; improvement steps refuse such a tour until it has been
    /// repaired with [`perform_all_avoid_loop_steps`](Self::perform_all_avoid_loop_steps).
    pub fn set_successors(&mut self, next: Vec<usize>) -> Result<()> {
        if next.len() != self.tour.len() {
            return Err(LocalSearchError::DimensionMismatch {
                matrix: self.tour.len(),
                tour: next.len(),
            });
        }
        self.tour = Tour::from_successors(next)?;
        Ok(())
    }

    /// Current tour.
    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Total cost of the current tour.
    pub fn tour_cost(&self) -> u64 {
        self.tour.cost(self.matrix)
    }

    /// Whether 2-opt uses the symmetric evaluation.
    pub fn is_symmetric_matrix(&self) -> bool {
        self.is_symmetric_matrix
    }

    /// Effective settings, after clamping.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    fn repeat(&mut self, mut step: impl FnMut(&mut Self) -> Gain) -> Gain {
        let mut total = 0;
        loop {
            let gain = step(self);
            if gain == 0 {
                return total;
            }
            total += gain;
        }
    }

    fn merge_sub_cycle(&mut self) -> Option<Gain> {
        let merge = avoid_loop::best_merge(
            self.matrix,
            &self.tour,
            &self.pool,
            self.config.nb_threads,
        )?;
        avoid_loop::apply(&mut self.tour, &merge);
        log::warn!(
            "avoid_loop: merged sub-cycle via {} and {} gain={}",
            merge.a,
            merge.b,
            merge.gain
        );
        Some(merge.gain)
    }

    fn snapshot(&self) -> RankSnapshot {
        match RankSnapshot::capture(&self.tour, REFERENCE_INDEX) {
            Some(snapshot) => snapshot,
            None => panic!(
                "tour is split into {} cycles; repair it with avoid_loop_step first",
                self.tour.cycles().len()
            ),
        }
    }

    /// Parallel scan against a fresh snapshot, then sequential commit.
    fn run_step<N: Neighborhood>(&mut self, neighborhood: &N) -> Gain {
        let snapshot = self.snapshot();
        let matrix = self.matrix;
        let limits = neighborhood.rank_limits(&self.partition);

        let winners: Vec<Option<Candidate<N::Move>>> = self.pool.install(|| {
            limits
                .par_windows(2)
                .map(|w| neighborhood.best_move(matrix, &snapshot, w[0]..w[1]))
                .collect()
        });

        let mut total = 0;
        let mut applied = 0;
        for candidate in winners.into_iter().flatten() {
            match neighborhood.gain_on(matrix, &self.tour, &candidate.mv) {
                Some(gain) if gain > 0 => {
                    neighborhood.apply(&mut self.tour, &candidate.mv);
                    total += gain;
                    applied += 1;
                }
                _ => log::trace!("{}: dropped stale {:?}", neighborhood.name(), candidate.mv),
            }
        }

        debug_assert!(self.tour.is_single_cycle());
        log::debug!("{}: gain={total} moves={applied}", neighborhood.name());
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> CostMatrix {
        let points: Vec<(f64, f64)> = (0..n).map(|i| (10.0 * i as f64, 0.0)).collect();
        CostMatrix::from_coordinates(&points)
    }

    fn crossing_matrix() -> CostMatrix {
        CostMatrix::from_rows(vec![
            vec![0, 10, 1, 1],
            vec![10, 0, 1, 1],
            vec![1, 1, 0, 10],
            vec![1, 1, 10, 0],
        ])
        .expect("square")
    }

    fn directed_matrix() -> CostMatrix {
        CostMatrix::from_rows(vec![
            vec![0, 10, 1, 20],
            vec![20, 0, 1, 1],
            vec![20, 5, 0, 10],
            vec![1, 20, 20, 0],
        ])
        .expect("square")
    }

    #[test]
    fn test_rejects_short_tour() {
        let dm = line(1);
        let err = LocalSearch::new(&dm, true, &[0], 1).unwrap_err();
        assert!(matches!(err, LocalSearchError::InvalidTour { .. }));
    }

    #[test]
    fn test_rejects_duplicate_index() {
        let dm = line(3);
        let err = LocalSearch::new(&dm, true, &[0, 2, 2], 1).unwrap_err();
        assert!(matches!(err, LocalSearchError::InvalidTour { .. }));
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let dm = line(4);
        let err = LocalSearch::new(&dm, true, &[0, 1, 2], 1).unwrap_err();
        assert!(matches!(
            err,
            LocalSearchError::DimensionMismatch { matrix: 4, tour: 3 }
        ));
    }

    #[test]
    fn test_clamps_settings() {
        let dm = line(4);
        let config = LocalSearchConfig::default()
            .with_nb_threads(0)
            .with_or_opt_max_chain(1);
        let ls = LocalSearch::with_config(&dm, true, &[0, 1, 2, 3], config).expect("valid");
        assert_eq!(ls.config().nb_threads, 1);
        assert_eq!(ls.config().or_opt_max_chain, 2);
    }

    #[test]
    fn test_two_opt_uncrosses() {
        for threads in [1, 2, 3, 8] {
            let dm = crossing_matrix();
            let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3], threads).expect("valid");
            assert_eq!(ls.tour_cost(), 22);
            assert_eq!(ls.two_opt_step(), 18);
            assert_eq!(ls.get_tour(0), vec![0, 2, 1, 3]);
            assert_eq!(ls.tour_cost(), 4);
            assert_eq!(ls.two_opt_step(), 0);
        }
    }

    #[test]
    fn test_optimal_tour_is_left_alone() {
        let dm = line(6);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3, 4, 5], 3).expect("valid");
        let before = ls.tour().clone();

        assert_eq!(ls.two_opt_step(), 0);
        assert_eq!(ls.asym_two_opt_step(), 0);
        assert_eq!(ls.relocate_step(), 0);
        assert_eq!(ls.or_opt_step(), 0);
        assert_eq!(ls.avoid_loop_step(), 0);
        assert_eq!(ls.perform_all_two_opt_steps(), 0);
        assert_eq!(ls.perform_all_asym_two_opt_steps(), 0);
        assert_eq!(ls.perform_all_relocate_steps(), 0);
        assert_eq!(ls.perform_all_or_opt_steps(), 0);
        assert_eq!(ls.perform_all_avoid_loop_steps(), 0);
        assert_eq!(ls.tour(), &before);
    }

    #[test]
    fn test_asymmetric_engine_uses_directed_gain() {
        let dm = directed_matrix();

        let mut asym = LocalSearch::new(&dm, false, &[0, 1, 2, 3], 2).expect("valid");
        assert_eq!(asym.asym_two_opt_step(), 14);
        assert_eq!(asym.tour_cost(), 8);

        // two_opt_step on an asymmetric engine must not report the
        // endpoint-only gain of 18.
        let mut fallback = LocalSearch::new(&dm, false, &[0, 1, 2, 3], 2).expect("valid");
        assert_eq!(fallback.two_opt_step(), 14);
        assert_eq!(fallback.tour(), asym.tour());
    }

    #[test]
    fn test_relocate_misplaced_node() {
        let dm = line(6);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 5, 3, 4], 1).expect("valid");
        assert_eq!(ls.tour_cost(), 120);
        assert_eq!(ls.relocate_step(), 20);
        assert_eq!(ls.tour_cost(), 100);
        assert!(ls.tour().is_single_cycle());
    }

    #[test]
    fn test_relocate_reports_actual_decrease_with_many_threads() {
        let dm = line(6);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 5, 3, 4], 4).expect("valid");
        let gain = ls.relocate_step();
        assert!(gain > 0);
        assert_eq!(120 - ls.tour_cost(), gain as u64);
    }

    #[test]
    fn test_avoid_loop_merges_two_cycles() {
        let dm = line(6);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3, 4, 5], 2).expect("valid");
        ls.set_successors(vec![1, 2, 0, 4, 5, 3]).expect("permutation");
        assert!(!ls.tour().is_single_cycle());
        assert_eq!(ls.tour_cost(), 80);

        assert_eq!(ls.avoid_loop_step(), -20);
        assert!(ls.tour().is_single_cycle());
        assert_eq!(ls.tour_cost(), 100);
        assert_eq!(ls.avoid_loop_step(), 0);
    }

    #[test]
    fn test_avoid_loop_merges_many_cycles() {
        let dm = line(7);
        let mut ls = LocalSearch::new(&dm, false, &[0, 1, 2, 3, 4, 5, 6], 3).expect("valid");
        ls.set_successors(vec![1, 0, 3, 2, 5, 4, 6]).expect("permutation");
        let before = ls.tour_cost() as i64;
        let gain = ls.perform_all_avoid_loop_steps();
        assert!(ls.tour().is_single_cycle());
        assert_eq!(before - gain, ls.tour_cost() as i64);
    }

    #[test]
    fn test_set_successors_validates() {
        let dm = line(4);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3], 1).expect("valid");
        assert!(matches!(
            ls.set_successors(vec![1, 0]),
            Err(LocalSearchError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ls.set_successors(vec![1, 1, 3, 0]),
            Err(LocalSearchError::InvalidTour { .. })
        ));
        assert_eq!(ls.get_tour(0), vec![0, 1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "repair it with avoid_loop_step")]
    fn test_step_on_split_tour_panics() {
        let dm = line(4);
        let mut ls = LocalSearch::new(&dm, true, &[0, 1, 2, 3], 1).expect("valid");
        ls.set_successors(vec![1, 0, 3, 2]).expect("permutation");
        ls.two_opt_step();
    }

    #[test]
    fn test_get_tour_rotations() {
        let dm = line(5);
        let ls = LocalSearch::new(&dm, true, &[3, 0, 4, 1, 2], 2).expect("valid");
        let from_zero = ls.get_tour(0);
        let from_four = ls.get_tour(4);
        assert_eq!(from_zero, vec![0, 4, 1, 2, 3]);
        assert_eq!(from_four, vec![4, 1, 2, 3, 0]);
    }
}
