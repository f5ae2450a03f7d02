//! Dense integer cost matrix.

use serde::{Deserialize, Serialize};

use super::Distance;
use crate::error::{LocalSearchError, Result};

/// A dense n×n cost matrix stored in row-major order.
///
/// Costs are non-negative integers and may be asymmetric
/// (`get(i, j) != get(j, i)` is allowed). The matrix is never mutated
/// once handed to a [`LocalSearch`](crate::local_search::LocalSearch).
///
/// # Examples
///
/// ```
/// use u_tour_opt::distance::CostMatrix;
///
/// let dm = CostMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
/// assert_eq!(dm.get(0, 1), 5);
/// assert_eq!(dm.size(), 3);
/// assert!(dm.is_symmetric());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCostMatrix")]
pub struct CostMatrix {
    data: Vec<Distance>,
    size: usize,
}

/// Unchecked wire form; deserialization goes through [`CostMatrix::from_data`].
#[derive(Deserialize)]
struct RawCostMatrix {
    data: Vec<Distance>,
    size: usize,
}

impl TryFrom<RawCostMatrix> for CostMatrix {
    type Error = LocalSearchError;

    fn try_from(raw: RawCostMatrix) -> Result<Self> {
        Self::from_data(raw.size, raw.data)
    }
}

impl CostMatrix {
    /// Creates a cost matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Computes a rounded Euclidean cost matrix from planar coordinates.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt().round() as Distance;
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a cost matrix from an explicit row-major n×n grid.
    ///
    /// Fails with [`LocalSearchError::MatrixLength`] if the data length
    /// doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<Distance>) -> Result<Self> {
        let expected = size * size;
        if data.len() != expected {
            return Err(LocalSearchError::MatrixLength {
                size,
                len: data.len(),
                expected,
            });
        }
        Ok(Self { data, size })
    }

    /// Creates a cost matrix from one row per location.
    pub fn from_rows(rows: Vec<Vec<Distance>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(LocalSearchError::NonSquareMatrix {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            data.extend(values);
        }
        Ok(Self { data, size })
    }

    /// Creates a cost matrix from a provider table where `None` marks a pair
    /// with no known route.
    ///
    /// Any unresolved pair rejects the whole table. The location reported is
    /// the one involved in the most unresolved pairs, as it is the likeliest
    /// to be unreachable (lowest index on ties).
    pub fn from_optional_rows(rows: Vec<Vec<Option<Distance>>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        let mut unfound_from = vec![0usize; size];
        let mut unfound_to = vec![0usize; size];

        for (i, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(LocalSearchError::NonSquareMatrix {
                    row: i,
                    len: values.len(),
                    expected: size,
                });
            }
            for (j, value) in values.into_iter().enumerate() {
                match value {
                    Some(d) => data.push(d),
                    None => {
                        // Either end may be responsible; decided below.
                        unfound_from[i] += 1;
                        unfound_to[j] += 1;
                        data.push(0);
                    }
                }
            }
        }

        let worst = (0..size)
            .map(|i| (i, unfound_from[i].max(unfound_to[i])))
            .filter(|&(_, count)| count > 0)
            .fold(None, |best: Option<(usize, usize)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        if let Some((index, _)) = worst {
            return Err(LocalSearchError::UnreachableLocation { index });
        }

        Ok(Self { data, size })
    }

    /// Returns the cost from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> Distance {
        self.data[from * self.size + to]
    }

    /// Sets the cost from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, cost: Distance) {
        self.data[from * self.size + to] = cost;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if `get(i, j) == get(j, i)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if self.get(i, j) != self.get(j, i) {
                    return false;
                }
            }
        }
        true
    }
}
