//! Local search configuration.

use serde::{Deserialize, Serialize};

/// Configuration parameters for [`LocalSearch`](super::LocalSearch).
///
/// # Examples
///
/// ```
/// use u_tour_opt::local_search::LocalSearchConfig;
///
/// let config = LocalSearchConfig::default()
///     .with_nb_threads(4)
///     .with_or_opt_max_chain(2)
///     .with_max_passes(10);
/// assert_eq!(config.nb_threads, 4);
/// assert_eq!(config.or_opt_max_chain, 2);
/// assert_eq!(config.max_passes, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    /// Number of worker threads scanning each step (clamped to at least 1).
    pub nb_threads: usize,
    /// Longest chain moved by Or-opt (clamped to at least 2).
    pub or_opt_max_chain: usize,
    /// Upper bound on full passes run by `optimize` (None for no bound).
    pub max_passes: Option<usize>,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            nb_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            or_opt_max_chain: 3,
            max_passes: None,
        }
    }
}

impl LocalSearchConfig {
    /// Sets the number of worker threads.
    pub fn with_nb_threads(mut self, n: usize) -> Self {
        self.nb_threads = n;
        self
    }

    /// Sets the longest chain considered by Or-opt.
    pub fn with_or_opt_max_chain(mut self, len: usize) -> Self {
        self.or_opt_max_chain = len;
        self
    }

    /// Sets the maximum number of full passes.
    pub fn with_max_passes(mut self, n: usize) -> Self {
        self.max_passes = Some(n);
        self
    }
}
