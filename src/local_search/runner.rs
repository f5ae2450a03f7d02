//! Full local search: every move family run to a common local optimum.
//!
//! # Algorithm
//!
//! 1. Repair a split tour with the sub-cycle merge, if needed
//! 2. Each pass runs, each to convergence:
//!    a. 2-opt (symmetric or direction-aware, following the matrix flag)
//!    b. relocate
//!    c. Or-opt
//! 3. Stop after a pass that gains nothing, or after `max_passes`

use serde::{Deserialize, Serialize};

use super::engine::LocalSearch;
use crate::distance::Gain;

/// Outcome of [`LocalSearch::optimize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Tour cost before the search.
    pub initial_cost: u64,
    /// Tour cost after the search.
    pub final_cost: u64,
    /// Passes executed, including the final one that gained nothing.
    pub passes: usize,
    /// Gain from sub-cycle repair (zero or negative).
    pub repair_gain: Gain,
    /// Gain from 2-opt.
    pub two_opt_gain: Gain,
    /// Gain from relocate.
    pub relocate_gain: Gain,
    /// Gain from Or-opt.
    pub or_opt_gain: Gain,
}

impl SearchReport {
    /// Sum of every family's gain; equals `initial_cost - final_cost`.
    pub fn total_gain(&self) -> Gain {
        self.repair_gain + self.two_opt_gain + self.relocate_gain + self.or_opt_gain
    }
}

impl LocalSearch<'_> {
    /// Runs every move family until none of them improves the tour.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tour_opt::distance::CostMatrix;
    /// use u_tour_opt::local_search::LocalSearch;
    ///
    /// let points: Vec<(f64, f64)> = (0..8).map(|i| (10.0 * i as f64, 0.0)).collect();
    /// let dm = CostMatrix::from_coordinates(&points);
    /// let mut ls = LocalSearch::new(&dm, true, &[0, 5, 2, 7, 1, 4, 6, 3], 2).unwrap();
    ///
    /// let report = ls.optimize();
    /// assert!(report.final_cost < report.initial_cost);
    /// assert_eq!(report.total_gain(), (report.initial_cost - report.final_cost) as i64);
    /// assert_eq!(ls.tour_cost(), report.final_cost);
    /// ```
    pub fn optimize(&mut self) -> SearchReport {
        let mut report = SearchReport {
            initial_cost: self.tour_cost(),
            ..SearchReport::default()
        };
        log::info!(
            "local_search: start n={} threads={} symmetric={} cost={}",
            self.tour().len(),
            self.config().nb_threads,
            self.is_symmetric_matrix(),
            report.initial_cost
        );

        if !self.tour().is_single_cycle() {
            report.repair_gain = self.perform_all_avoid_loop_steps();
        }

        loop {
            let two_opt = if self.is_symmetric_matrix() {
                self.perform_all_two_opt_steps()
            } else {
                self.perform_all_asym_two_opt_steps()
            };
            let relocate = self.perform_all_relocate_steps();
            let or_opt = self.perform_all_or_opt_steps();

            report.passes += 1;
            report.two_opt_gain += two_opt;
            report.relocate_gain += relocate;
            report.or_opt_gain += or_opt;
            log::info!(
                "local_search: pass={} two_opt={two_opt} relocate={relocate} or_opt={or_opt}",
                report.passes
            );

            if two_opt + relocate + or_opt == 0 {
                break;
            }
            if self.config().max_passes.is_some_and(|max| report.passes >= max) {
                break;
            }
        }

        report.final_cost = self.tour_cost();
        log::info!(
            "local_search: done passes={} cost={} gain={}",
            report.passes,
            report.final_cost,
            report.total_gain()
        );
        report
    }
}
