//! Error types for engine construction and matrix intake.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LocalSearchError>;

/// Input validation failures.
///
/// Every variant is raised synchronously by the constructor or intake
/// function that detects it; no engine is created on failure. Broken
/// internal invariants (e.g. a tour left split into sub-cycles after a
/// repair pass) are bugs and panic instead.
#[derive(Error, Debug)]
pub enum LocalSearchError {
    /// The tour is not a permutation of `0..n` or is shorter than 2.
    #[error("invalid tour: {reason}")]
    InvalidTour {
        /// What is wrong with the sequence.
        reason: String,
    },

    /// The matrix size does not match the tour's index universe.
    #[error("matrix has {matrix} locations but tour has {tour}")]
    DimensionMismatch {
        /// Matrix side length.
        matrix: usize,
        /// Tour length.
        tour: usize,
    },

    /// A row-major buffer does not hold `size * size` entries.
    #[error("matrix of size {size} needs {expected} entries, got {len}")]
    MatrixLength {
        /// Declared side length.
        size: usize,
        /// Buffer length.
        len: usize,
        /// `size * size`.
        expected: usize,
    },

    /// A row of an explicit matrix has the wrong length.
    #[error("matrix row {row} has {len} entries, expected {expected}")]
    NonSquareMatrix {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Number of rows.
        expected: usize,
    },

    /// The matrix provider left pairs unresolved around this location.
    #[error("no route found to or from location {index}")]
    UnreachableLocation {
        /// Location most likely responsible.
        index: usize,
    },

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl LocalSearchError {
    pub(crate) fn invalid_tour(reason: impl Into<String>) -> Self {
        Self::InvalidTour {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LocalSearchError::invalid_tour("index 3 appears twice");
        assert_eq!(err.to_string(), "invalid tour: index 3 appears twice");

        let err = LocalSearchError::DimensionMismatch { matrix: 4, tour: 5 };
        assert_eq!(err.to_string(), "matrix has 4 locations but tour has 5");
    }
}
