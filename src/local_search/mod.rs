//! Parallel local search over a single TSP tour.
//!
//! - [`LocalSearch`] — engine owning the tour and the worker pool
//! - [`LocalSearchConfig`] — thread count, Or-opt chain length, pass limit
//! - [`SearchReport`] — outcome of [`LocalSearch::optimize`]
//!
//! Move families:
//!
//! - 2-opt segment reversal, symmetric and direction-aware (`two_opt`)
//! - relocate and Or-opt chain moves (`or_opt`)
//! - sub-cycle repair (`avoid_loop`)

mod avoid_loop;
mod config;
mod engine;
mod neighborhood;
mod or_opt;
mod runner;
mod two_opt;

pub use config::LocalSearchConfig;
pub use engine::LocalSearch;
pub use runner::SearchReport;
