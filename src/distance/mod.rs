//! Cost matrices.
//!
//! Provides the dense integer matrix the local search reads from, plus the
//! scalar types shared by every move evaluation.

mod matrix;

pub use matrix::CostMatrix;

/// Non-negative cost of travelling between two locations.
pub type Distance = u32;

/// Signed cost delta of a move; positive means the tour got cheaper.
pub type Gain = i64;
