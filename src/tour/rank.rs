//! Rank snapshots and per-thread rank partitions.

use super::Tour;

/// Locations listed by rank along the tour, captured at step entry.
///
/// Workers only ever read a snapshot; it is rebuilt before each step and
/// never outlives it.
#[derive(Debug, Clone)]
pub struct RankSnapshot {
    order: Vec<usize>,
}

impl RankSnapshot {
    /// Walks the tour from `reference`, assigning ranks `0..n`.
    ///
    /// Returns `None` if the walk closes before visiting every location,
    /// i.e. the tour is split into sub-cycles.
    pub fn capture(tour: &Tour, reference: usize) -> Option<Self> {
        let n = tour.len();
        let mut order = Vec::with_capacity(n);
        let mut seen = vec![false; n];
        let mut cur = reference;
        for _ in 0..n {
            if seen[cur] {
                return None;
            }
            seen[cur] = true;
            order.push(cur);
            cur = tour.next(cur);
        }
        (cur == reference).then_some(Self { order })
    }

    /// Number of ranked locations.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false` for a captured tour.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Location at rank `r`, taken modulo the tour length.
    #[inline]
    pub fn at(&self, r: usize) -> usize {
        self.order[r % self.order.len()]
    }
}

/// Rank ranges assigned to each worker, fixed for the engine's lifetime.
///
/// Both tables hold `nb_threads + 1` non-decreasing boundaries from `0` to
/// `n`; worker `t` scans `limits[t]..limits[t + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPartition {
    limits: Vec<usize>,
    sym_two_opt_limits: Vec<usize>,
}

impl RankPartition {
    /// Precomputes the partitions of `n` ranks over `nb_threads` workers.
    pub fn new(n: usize, nb_threads: usize) -> Self {
        let nb_threads = nb_threads.max(1);
        Self {
            limits: even_limits(n, nb_threads),
            sym_two_opt_limits: triangular_limits(n, nb_threads),
        }
    }

    /// Nearly equal contiguous chunks of `0..n`.
    pub fn limits(&self) -> &[usize] {
        &self.limits
    }

    /// Chunks of first-edge ranks balancing the `i < j` pair region.
    pub fn sym_two_opt_limits(&self) -> &[usize] {
        &self.sym_two_opt_limits
    }
}

/// Splits `0..n` into `parts` contiguous ranges whose sizes differ by at
/// most one. Extra parts beyond `n` are empty.
pub(crate) fn even_limits(n: usize, parts: usize) -> Vec<usize> {
    (0..=parts).map(|t| t * n / parts).collect()
}

/// Row `i` of the symmetric pair scan visits about `n - 1 - i` partners, so
/// boundaries are placed where the cumulative row weight crosses each
/// `total * t / parts`.
fn triangular_limits(n: usize, parts: usize) -> Vec<usize> {
    let total = (n * n.saturating_sub(1) / 2) as u64;
    let mut limits = Vec::with_capacity(parts + 1);
    limits.push(0);

    let mut i = 0;
    let mut cumulated = 0u64;
    for t in 1..parts {
        let target = total * t as u64 / parts as u64;
        while i < n && cumulated < target {
            cumulated += (n - 1 - i) as u64;
            i += 1;
        }
        limits.push(i);
    }
    limits.push(n);
    limits
}
