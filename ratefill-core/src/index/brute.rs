//! Exhaustive pairwise ranking over the filled view.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    Result,
    distance::{CosineNorms, Norm, Vector, VectorKind, cosine_distance},
    error::RatingError,
    matrix::FilledView,
};

use super::{Neighbour, SelfMatch};

pub(super) struct BruteForce<'a> {
    vendors: &'a [Arc<str>],
    filled: &'a FilledView,
    norms: Vec<Norm>,
    neighbours: usize,
    self_match: SelfMatch,
}

impl<'a> BruteForce<'a> {
    pub(super) fn new(
        vendors: &'a [Arc<str>],
        filled: &'a FilledView,
        neighbours: usize,
        self_match: SelfMatch,
    ) -> Result<Self> {
        let norms = filled
            .iter()
            .enumerate()
            .map(|(row, values)| {
                Vector::new(values, VectorKind::Left)
                    .and_then(|vector| Norm::from_vector(&vector, VectorKind::Left))
                    .map_err(|error| RatingError::Distance {
                        left: Arc::clone(&vendors[row]),
                        right: Arc::clone(&vendors[row]),
                        error,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vendors,
            filled,
            norms,
            neighbours,
            self_match,
        })
    }

    pub(super) fn run_sequential(&self) -> Result<Vec<Vec<Neighbour>>> {
        (0..self.filled.rows()).map(|row| self.rank(row)).collect()
    }

    #[cfg(feature = "parallel")]
    pub(super) fn run_parallel(&self) -> Result<Vec<Vec<Neighbour>>> {
        (0..self.filled.rows())
            .into_par_iter()
            .map(|row| self.rank(row))
            .collect()
    }

    /// Ranks every candidate row against `row` and keeps the closest.
    fn rank(&self, row: usize) -> Result<Vec<Neighbour>> {
        let rows = self.filled.rows();
        let query = self.vector(row);
        let mut candidates = Vec::with_capacity(rows);
        for other in 0..rows {
            if other == row && self.self_match == SelfMatch::Exclude {
                continue;
            }
            let norms = CosineNorms::from_norms(self.norms[row], self.norms[other]);
            let distance = cosine_distance(query, self.vector(other), Some(norms)).map_err(
                |error| RatingError::Distance {
                    left: Arc::clone(&self.vendors[row]),
                    right: Arc::clone(&self.vendors[other]),
                    error,
                },
            )?;
            candidates.push(Neighbour {
                vendor_id: Arc::clone(&self.vendors[other]),
                row: other,
                distance: distance.value(),
            });
        }
        if candidates.len() > self.neighbours {
            candidates.select_nth_unstable(self.neighbours - 1);
            candidates.truncate(self.neighbours);
        }
        candidates.sort_unstable();
        Ok(candidates)
    }

    fn vector(&self, row: usize) -> &'a [f64] {
        self.filled.row(row).unwrap_or_default()
    }
}
