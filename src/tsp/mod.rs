//! Problem side of the solver: cities, distance metrics, and tours.
//!
//! - [`CityTable`] / [`Point`]: the read-only city set
//! - [`DistanceMetric`]: pluggable edge cost ([`Euclidean`], [`DistanceMatrix`])
//! - [`Tour`]: a permutation of the cities with a cached closed length
//! - [`cities`]: random instances and CSV loading

pub mod cities;
mod metric;
mod tour;

pub use metric::{CityTable, DistanceMatrix, DistanceMetric, Euclidean, Point};
pub use tour::Tour;
