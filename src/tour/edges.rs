//! Successor-array tour representation.

use crate::distance::CostMatrix;
use crate::error::{LocalSearchError, Result};

/// A cyclic tour stored as a successor array: `next[i]` is the location
/// visited right after `i`.
///
/// Built from an ordered sequence, a `Tour` is always one Hamiltonian
/// cycle. [`Tour::from_successors`] only checks for a permutation, so a
/// tour built that way may consist of several disjoint cycles until it is
/// repaired.
///
/// # Examples
///
/// ```
/// use u_tour_opt::tour::Tour;
///
/// let tour = Tour::from_sequence(&[2, 0, 3, 1]).unwrap();
/// assert_eq!(tour.next(2), 0);
/// assert_eq!(tour.next(1), 2);
/// assert_eq!(tour.sequence_from(0), vec![0, 3, 1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    next: Vec<usize>,
}

impl Tour {
    /// Builds the successor array of the cycle visiting `sequence` in order.
    ///
    /// Fails with [`LocalSearchError::InvalidTour`] unless `sequence` is a
    /// permutation of `0..sequence.len()` with at least two elements.
    pub fn from_sequence(sequence: &[usize]) -> Result<Self> {
        let n = sequence.len();
        if n < 2 {
            return Err(LocalSearchError::invalid_tour(format!(
                "a tour needs at least 2 locations, got {n}"
            )));
        }
        check_permutation(sequence)?;

        let mut next = vec![0; n];
        for (k, &loc) in sequence.iter().enumerate() {
            next[loc] = sequence[(k + 1) % n];
        }
        Ok(Self { next })
    }

    /// Wraps a raw successor array.
    ///
    /// The array must be a permutation of `0..next.len()`; it may describe
    /// several disjoint cycles.
    pub fn from_successors(next: Vec<usize>) -> Result<Self> {
        if next.len() < 2 {
            return Err(LocalSearchError::invalid_tour(format!(
                "a tour needs at least 2 locations, got {}",
                next.len()
            )));
        }
        check_permutation(&next)?;
        Ok(Self { next })
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// Always `false`; a tour has at least two locations.
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Successor of `loc`.
    #[inline]
    pub fn next(&self, loc: usize) -> usize {
        self.next[loc]
    }

    #[inline]
    pub(crate) fn set_next(&mut self, loc: usize, succ: usize) {
        self.next[loc] = succ;
    }

    /// The raw successor array.
    pub fn successors(&self) -> &[usize] {
        &self.next
    }

    /// Follows successors exactly `len()` times starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start >= len()`.
    pub fn sequence_from(&self, start: usize) -> Vec<usize> {
        let mut seq = Vec::with_capacity(self.next.len());
        let mut cur = start;
        for _ in 0..self.next.len() {
            seq.push(cur);
            cur = self.next[cur];
        }
        seq
    }

    /// Total cost of every edge `i -> next[i]`.
    pub fn cost(&self, matrix: &CostMatrix) -> u64 {
        self.next
            .iter()
            .enumerate()
            .map(|(i, &j)| u64::from(matrix.get(i, j)))
            .sum()
    }

    /// Disjoint cycles of the successor array, each listed in travel order
    /// from its lowest location; cycles are ordered by that location.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let n = self.next.len();
        let mut seen = vec![false; n];
        let mut cycles = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut cur = start;
            while !seen[cur] {
                seen[cur] = true;
                cycle.push(cur);
                cur = self.next[cur];
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// `true` if following successors from location 0 visits every location
    /// before coming back.
    pub fn is_single_cycle(&self) -> bool {
        let n = self.next.len();
        let mut cur = 0;
        for step in 1..=n {
            cur = self.next[cur];
            if cur == 0 {
                return step == n;
            }
        }
        false
    }
}

fn check_permutation(values: &[usize]) -> Result<()> {
    let n = values.len();
    let mut seen = vec![false; n];
    for &v in values {
        if v >= n {
            return Err(LocalSearchError::invalid_tour(format!(
                "index {v} is out of range for {n} locations"
            )));
        }
        if seen[v] {
            return Err(LocalSearchError::invalid_tour(format!(
                "index {v} appears more than once"
            )));
        }
        seen[v] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence_builds_cycle() {
        let tour = Tour::from_sequence(&[0, 2, 1, 3]).expect("valid");
        assert_eq!(tour.successors(), &[2, 3, 1, 0]);
        assert!(tour.is_single_cycle());
        assert_eq!(tour.cycles().len(), 1);
    }

    #[test]
    fn test_from_sequence_rejects_short() {
        assert!(matches!(
            Tour::from_sequence(&[0]),
            Err(LocalSearchError::InvalidTour { .. })
        ));
        assert!(Tour::from_sequence(&[]).is_err());
    }

    #[test]
    fn test_from_sequence_rejects_duplicate() {
        let err = Tour::from_sequence(&[0, 1, 1]).unwrap_err();
        assert_eq!(err.to_string(), "invalid tour: index 1 appears more than once");
    }

    #[test]
    fn test_from_sequence_rejects_out_of_range() {
        assert!(Tour::from_sequence(&[0, 1, 5]).is_err());
    }

    #[test]
    fn test_two_locations() {
        let tour = Tour::from_sequence(&[1, 0]).expect("valid");
        assert_eq!(tour.successors(), &[1, 0]);
        assert!(tour.is_single_cycle());
    }

    #[test]
    fn test_sequence_from_is_rotation() {
        let tour = Tour::from_sequence(&[3, 1, 4, 0, 2]).expect("valid");
        assert_eq!(tour.sequence_from(3), vec![3, 1, 4, 0, 2]);
        assert_eq!(tour.sequence_from(0), vec![0, 2, 3, 1, 4]);
    }

    #[test]
    fn test_from_successors_allows_sub_cycles() {
        let tour = Tour::from_successors(vec![1, 0, 3, 2]).expect("permutation");
        assert!(!tour.is_single_cycle());
        assert_eq!(tour.cycles(), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_from_successors_rejects_non_permutation() {
        assert!(Tour::from_successors(vec![1, 1, 0]).is_err());
    }

    #[test]
    fn test_cost() {
        let dm = CostMatrix::from_data(3, vec![0, 1, 9, 9, 0, 2, 3, 9, 0]).expect("valid");
        let tour = Tour::from_sequence(&[0, 1, 2]).expect("valid");
        assert_eq!(tour.cost(&dm), 6);
    }
}
