//! Points, the city table, and pluggable distance metrics.

use crate::error::{Result, SsgaError};

/// A city: contiguous identifier plus coordinates in any dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Identifier, in `0..n`.
    pub id: usize,
    /// Coordinates. All points of a table share the same dimension.
    pub coords: Vec<f64>,
}

impl Point {
    /// Creates a 2D point.
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self {
            id,
            coords: vec![x, y],
        }
    }

    /// Creates a point with arbitrary dimension.
    pub fn with_coords(id: usize, coords: Vec<f64>) -> Self {
        Self { id, coords }
    }
}

/// Read-only table of cities, indexed by identifier.
///
/// Built once from a city source and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CityTable {
    points: Vec<Point>,
}

impl CityTable {
    /// Builds a table, checking that identifiers form the range `0..n`
    /// and that every point has the same finite coordinate dimension.
    ///
    /// Points may arrive in any order; they are stored by identifier.
    pub fn new(mut points: Vec<Point>) -> Result<Self> {
        if points.is_empty() {
            return Err(SsgaError::city_source("city table must not be empty"));
        }
        points.sort_by_key(|p| p.id);
        for (expected, p) in points.iter().enumerate() {
            if p.id != expected {
                return Err(SsgaError::city_source(format!(
                    "identifiers must be contiguous 0..{}: expected {expected}, found {}",
                    points.len(),
                    p.id
                )));
            }
        }
        let dim = points[0].coords.len();
        if dim == 0 {
            return Err(SsgaError::city_source("points must have at least one coordinate"));
        }
        for p in &points {
            if p.coords.len() != dim {
                return Err(SsgaError::city_source(format!(
                    "point {} has {} coordinates, expected {dim}",
                    p.id,
                    p.coords.len()
                )));
            }
            if p.coords.iter().any(|c| !c.is_finite()) {
                return Err(SsgaError::city_source(format!(
                    "point {} has a non-finite coordinate",
                    p.id
                )));
            }
        }
        Ok(Self { points })
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: empty tables are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Looks up a point by identifier.
    pub fn point(&self, id: usize) -> Result<&Point> {
        self.points.get(id).ok_or(SsgaError::InvalidPoint {
            id,
            len: self.points.len(),
        })
    }

    /// All points, ordered by identifier.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Fails unless the table holds exactly `input_size` cities.
    pub fn check_size(&self, input_size: usize) -> Result<()> {
        if self.points.len() != input_size {
            return Err(SsgaError::city_source(format!(
                "city source supplied {} points, input_size is {input_size}",
                self.points.len()
            )));
        }
        Ok(())
    }
}

/// Cost of travelling between two cities.
///
/// Implementations must be non-negative and pure. Symmetry is expected by
/// the edge-based diversity measure but not by tour length evaluation; the
/// triangle inequality is not required.
pub trait DistanceMetric: Send + Sync {
    /// Number of cities the metric is defined over.
    fn point_count(&self) -> usize;

    /// Distance between two valid identifiers.
    ///
    /// Callers guarantee `a, b < point_count()`; use
    /// [`checked_distance`](DistanceMetric::checked_distance) otherwise.
    ///
    /// # Panics
    ///
    /// Implementations may panic if either identifier is out of range.
    fn distance(&self, a: usize, b: usize) -> f64;

    /// Distance with identifier validation.
    fn checked_distance(&self, a: usize, b: usize) -> Result<f64> {
        let len = self.point_count();
        for id in [a, b] {
            if id >= len {
                return Err(SsgaError::InvalidPoint { id, len });
            }
        }
        Ok(self.distance(a, b))
    }
}

/// Euclidean distance over a [`CityTable`].
#[derive(Debug, Clone)]
pub struct Euclidean {
    cities: CityTable,
}

impl Euclidean {
    /// Wraps a city table.
    pub fn new(cities: CityTable) -> Self {
        Self { cities }
    }

    /// Builds the table from raw points.
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        Ok(Self::new(CityTable::new(points)?))
    }

    /// The underlying city table.
    pub fn cities(&self) -> &CityTable {
        &self.cities
    }
}

impl DistanceMetric for Euclidean {
    fn point_count(&self) -> usize {
        self.cities.len()
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        let pa = &self.cities.points[a].coords;
        let pb = &self.cities.points[b].coords;
        pa.iter()
            .zip(pb.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

/// Precomputed square distance matrix.
///
/// Row `a`, column `b` holds the cost of the edge `a -> b`. The matrix need
/// not be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from rows, rejecting ragged, negative, or non-finite
    /// input.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(SsgaError::city_source("distance matrix must not be empty"));
        }
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(SsgaError::city_source(format!(
                    "distance matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|d| !d.is_finite() || **d < 0.0) {
                return Err(SsgaError::city_source(format!(
                    "distance matrix row {i} contains invalid distance {bad}"
                )));
            }
            data.extend(row);
        }
        Ok(Self { n, data })
    }

    /// Precomputes a matrix from any other metric.
    pub fn from_metric<M: DistanceMetric + ?Sized>(metric: &M) -> Self {
        let n = metric.point_count();
        let mut data = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                data.push(metric.distance(a, b));
            }
        }
        Self { n, data }
    }

    /// Whether `d(a, b) == d(b, a)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|a| (a + 1..self.n).all(|b| self.distance(a, b) == self.distance(b, a)))
    }
}

impl DistanceMetric for DistanceMatrix {
    fn point_count(&self) -> usize {
        self.n
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self.data[a * self.n + b]
    }
}
