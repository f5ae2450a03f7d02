//! # u-tour-opt
//!
//! Parallel local search improving a Traveling-Salesman tour over a dense
//! integer cost matrix, symmetric or not.
//!
//! ## Modules
//!
//! - [`distance`] — Cost matrix and the `Distance`/`Gain` scalars
//! - [`tour`] — Successor-array tour, rank snapshots, thread partitions
//! - [`local_search`] — 2-opt, relocate, Or-opt and sub-cycle repair steps
//! - [`error`] — Construction and intake errors
//!
//! ## Example
//!
//! ```
//! use u_tour_opt::distance::CostMatrix;
//! use u_tour_opt::local_search::LocalSearch;
//!
//! let dm = CostMatrix::from_coordinates(&[
//!     (0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0),
//! ]);
//! let mut ls = LocalSearch::new(&dm, dm.is_symmetric(), &[0, 1, 2, 3], 2)?;
//! let report = ls.optimize();
//! assert_eq!(report.final_cost, 40);
//! assert_eq!(ls.get_tour(0), vec![0, 2, 1, 3]);
//! # Ok::<(), u_tour_opt::error::LocalSearchError>(())
//! ```

pub mod distance;
pub mod error;
pub mod local_search;
pub mod tour;
