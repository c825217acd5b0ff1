//! Steady-state genetic algorithm for the travelling salesman problem.
//!
//! - **TSP model** ([`tsp`]): cities, pluggable distance metrics, and
//!   tours that cache their closed length.
//! - **SSGA engine** ([`ssga`]): diversity-aware parent selection, order
//!   crossover, swap or inversion mutation, steady-state replacement of
//!   the weakest members, and an adaptive mutation rate.
//!
//! # Example
//!
//! ```
//! use ssga_tsp::ssga::{SsgaConfig, SsgaRunner};
//! use ssga_tsp::tsp::{Euclidean, Point};
//!
//! let metric = Euclidean::from_points(vec![
//!     Point::new(0, 0.0, 0.0),
//!     Point::new(1, 1.0, 0.0),
//!     Point::new(2, 1.0, 1.0),
//!     Point::new(3, 0.0, 1.0),
//! ])
//! .unwrap();
//! let config = SsgaConfig::default()
//!     .with_input_size(4)
//!     .with_pop_size(10)
//!     .with_max_generations(20)
//!     .with_seed(1);
//!
//! let result = SsgaRunner::from_config(&metric, config).unwrap().run().unwrap();
//! assert!((result.best_length - 4.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod random;
pub mod ssga;
pub mod tsp;

pub use error::{Result, SsgaError};
