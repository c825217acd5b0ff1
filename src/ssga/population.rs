//! Fixed-size population of tours.
//!
//! The population owns its tours and never changes cardinality: the only
//! way to alter it after construction is [`Population::replace`], which
//! swaps one member for another.

use crate::error::{Result, SsgaError};
use crate::tsp::{DistanceMetric, Tour};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Above this many members, diversity compares each tour only with its
/// next `DIVERSITY_NEIGHBOURS` members (circularly) instead of every pair.
const DIVERSITY_EXACT_LIMIT: usize = 64;
const DIVERSITY_NEIGHBOURS: usize = 32;

/// An ordered collection of tours with a fixed size.
#[derive(Debug, Clone)]
pub struct Population {
    tours: Vec<Tour>,
    point_count: usize,
}

impl Population {
    /// `size` independent uniformly random permutations of `0..point_count`.
    pub fn initialize<R: Rng>(size: usize, point_count: usize, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(SsgaError::config("population size must be at least 1"));
        }
        let tours: Vec<Tour> = (0..size).map(|_| Tour::random(point_count, rng)).collect();
        Self::from_tours(tours, point_count)
    }

    /// Wraps externally seeded tours, validating each one.
    pub fn from_tours(tours: Vec<Tour>, point_count: usize) -> Result<Self> {
        if tours.is_empty() {
            return Err(SsgaError::config("population size must be at least 1"));
        }
        for tour in &tours {
            tour.ensure_valid(point_count, "population initialization")?;
        }
        Ok(Self { tours, point_count })
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    /// Always false: empty populations are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// Number of cities every member visits.
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Members in insertion order.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    /// Member at `index`.
    pub fn get(&self, index: usize) -> Option<&Tour> {
        self.tours.get(index)
    }

    /// Computes every member's length that is not cached yet.
    pub fn evaluate<M: DistanceMetric + ?Sized>(&mut self, metric: &M, parallel: bool) -> Result<()> {
        evaluate_tours(&mut self.tours, metric, parallel)
    }

    /// Indices sorted by length ascending; ties keep insertion order.
    ///
    /// Unevaluated members rank as infinitely long.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.tours.len()).collect();
        indices.sort_by(|&a, &b| self.tours[a].fitness().total_cmp(&self.tours[b].fitness()));
        indices
    }

    /// The `k` shortest tours, best first, ties in insertion order.
    pub fn fittest(&self, k: usize) -> Vec<&Tour> {
        self.ranked_indices()
            .into_iter()
            .take(k)
            .map(|i| &self.tours[i])
            .collect()
    }

    /// Indices of the `k` longest tours, worst first.
    ///
    /// Among equal lengths the later member counts as weaker.
    pub fn weakest_indices(&self, k: usize) -> Vec<usize> {
        let mut ranked = self.ranked_indices();
        ranked.reverse();
        ranked.truncate(k);
        ranked
    }

    /// The shortest tour.
    pub fn best(&self) -> &Tour {
        let ranked = self.ranked_indices();
        &self.tours[ranked[0]]
    }

    /// Mean length over evaluated members, `None` if none are evaluated.
    pub fn mean_length(&self) -> Option<f64> {
        let lengths: Vec<f64> = self.tours.iter().filter_map(Tour::cached_length).collect();
        if lengths.is_empty() {
            None
        } else {
            Some(lengths.iter().sum::<f64>() / lengths.len() as f64)
        }
    }

    /// Mean pairwise edge difference, normalized to `[0, 1]`.
    ///
    /// 0 means every member describes the same cycle; 1 means no two
    /// members share an edge. Small populations compare every pair; large
    /// ones compare each member with a fixed window of its successors.
    pub fn diversity(&self) -> f64 {
        let size = self.tours.len();
        let n = self.point_count;
        if size < 2 || n == 0 {
            return 0.0;
        }

        let mut total = 0usize;
        let mut pairs = 0usize;
        if size <= DIVERSITY_EXACT_LIMIT {
            for i in 0..size {
                for j in (i + 1)..size {
                    total += self.tours[i].edge_distance(&self.tours[j]);
                    pairs += 1;
                }
            }
        } else {
            for i in 0..size {
                for step in 1..=DIVERSITY_NEIGHBOURS {
                    let j = (i + step) % size;
                    total += self.tours[i].edge_distance(&self.tours[j]);
                    pairs += 1;
                }
            }
        }
        total as f64 / (pairs * n) as f64
    }

    /// Replaces the member at `index`, returning the displaced tour.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn replace(&mut self, index: usize, tour: Tour) -> Tour {
        std::mem::replace(&mut self.tours[index], tour)
    }

    /// Consumes the population, returning its members.
    pub fn into_tours(self) -> Vec<Tour> {
        self.tours
    }
}

/// Computes lengths for a batch of tours, optionally with rayon.
///
/// Evaluation draws no random numbers, so the result does not depend on
/// `parallel`.
pub(crate) fn evaluate_tours<M: DistanceMetric + ?Sized>(
    tours: &mut [Tour],
    metric: &M,
    parallel: bool,
) -> Result<()> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return tours
                .par_iter_mut()
                .try_for_each(|tour| tour.length(metric).map(|_| ()));
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for tour in tours.iter_mut() {
        tour.length(metric)?;
    }
    Ok(())
}
