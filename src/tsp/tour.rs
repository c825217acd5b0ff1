//! Tours: closed visiting orders over every city exactly once.

use super::metric::DistanceMetric;
use crate::error::{Result, SsgaError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cell::Cell;

/// A candidate solution: a permutation of `0..n` read as a closed loop.
///
/// The total length is computed on first request and cached. Every method
/// that rearranges the sequence clears the cache.
#[derive(Debug, Clone)]
pub struct Tour {
    cities: Vec<usize>,
    length: Cell<Option<f64>>,
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.cities == other.cities
    }
}

impl Eq for Tour {}

impl Tour {
    /// Wraps a sequence without checking it. Pair with [`validate`](Self::validate)
    /// or [`ensure_valid`](Self::ensure_valid) when the source is untrusted.
    pub fn new(cities: Vec<usize>) -> Self {
        Self {
            cities,
            length: Cell::new(None),
        }
    }

    /// Wraps a sequence, failing unless it is a permutation of `0..point_count`.
    pub fn try_from_cities(cities: Vec<usize>, point_count: usize) -> Result<Self> {
        let tour = Self::new(cities);
        tour.ensure_valid(point_count, "tour construction")?;
        Ok(tour)
    }

    /// The tour `0, 1, ..., n-1`.
    pub fn identity(n: usize) -> Self {
        Self::new((0..n).collect())
    }

    /// A uniformly random permutation of `0..n`.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut cities: Vec<usize> = (0..n).collect();
        cities.shuffle(rng);
        Self::new(cities)
    }

    /// The visiting order.
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Consumes the tour, returning the visiting order.
    pub fn into_cities(self) -> Vec<usize> {
        self.cities
    }

    /// Number of cities visited.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the tour visits no city.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Total closed length, including the edge from the last city back to the first.
    ///
    /// Cached after the first call.
    pub fn length<M: DistanceMetric + ?Sized>(&self, metric: &M) -> Result<f64> {
        if let Some(len) = self.length.get() {
            return Ok(len);
        }
        let mut total = 0.0;
        for (a, b) in self.edges() {
            total += metric.checked_distance(a, b)?;
        }
        self.length.set(Some(total));
        Ok(total)
    }

    /// The cached length, if it has been computed.
    pub fn cached_length(&self) -> Option<f64> {
        self.length.get()
    }

    /// Cached length, or `f64::INFINITY` for a tour never evaluated.
    ///
    /// Lower is fitter.
    pub fn fitness(&self) -> f64 {
        self.length.get().unwrap_or(f64::INFINITY)
    }

    /// Whether the sequence is a permutation of `0..len()`.
    pub fn validate(&self) -> bool {
        self.permutation_defect(self.cities.len()).is_none()
    }

    /// Fails with [`SsgaError::PermutationInvariantViolation`] unless the
    /// sequence is a permutation of `0..point_count`.
    pub fn ensure_valid(&self, point_count: usize, operator: &'static str) -> Result<()> {
        match self.permutation_defect(point_count) {
            None => Ok(()),
            Some(detail) => Err(SsgaError::PermutationInvariantViolation { operator, detail }),
        }
    }

    fn permutation_defect(&self, point_count: usize) -> Option<String> {
        if self.cities.len() != point_count {
            return Some(format!(
                "tour has {} cities, expected {point_count}",
                self.cities.len()
            ));
        }
        let mut seen = vec![false; point_count];
        for &c in &self.cities {
            if c >= point_count {
                return Some(format!("city {c} is out of range"));
            }
            if seen[c] {
                return Some(format!("city {c} appears twice"));
            }
            seen[c] = true;
        }
        None
    }

    /// Exchanges the cities at positions `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.cities.swap(i, j);
        self.invalidate();
    }

    /// Reverses the positions `start..=end`.
    pub fn reverse_segment(&mut self, start: usize, end: usize) {
        self.cities[start..=end].reverse();
        self.invalidate();
    }

    /// Clears the cached length.
    pub fn invalidate(&mut self) {
        self.length.set(None);
    }

    /// Consecutive city pairs, wrapping from the last city to the first.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.cities.len();
        (0..n).map(move |i| (self.cities[i], self.cities[(i + 1) % n]))
    }

    /// Number of undirected edges of `self` that do not appear in `other`.
    ///
    /// Ranges over `0..=len()`. Both tours must be permutations of the
    /// same city set.
    pub fn edge_distance(&self, other: &Tour) -> usize {
        let n = other.cities.len();
        if n == 0 {
            return 0;
        }
        let mut neighbours = vec![(usize::MAX, usize::MAX); n];
        for i in 0..n {
            let c = other.cities[i];
            neighbours[c] = (other.cities[(i + n - 1) % n], other.cities[(i + 1) % n]);
        }
        self.edges()
            .filter(|&(a, b)| {
                let (prev, next) = neighbours[a];
                prev != b && next != b
            })
            .count()
    }
}
