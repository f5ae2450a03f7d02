//! Tour representation and search-space partitioning.
//!
//! - [`Tour`] — successor array of the current cycle
//! - [`RankSnapshot`] — tour positions captured at the start of a step
//! - [`RankPartition`] — per-thread rank ranges

mod edges;
mod rank;

pub use edges::Tour;
pub use rank::{RankPartition, RankSnapshot};

pub(crate) use rank::even_limits;
