//! Error types for the SSGA engine.
//!
//! Every failure the core can produce is fatal: configuration mistakes are
//! rejected before a run starts, and the remaining variants indicate an
//! integration or operator bug. Nothing here is retryable.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SsgaError>;

/// Unified error type for the TSP steady-state GA.
#[derive(Debug, Error)]
pub enum SsgaError {
    /// An option violates its documented domain.
    #[error("configuration error: {message}")]
    Configuration {
        /// Which option failed and why.
        message: String,
    },

    /// A point identifier outside the loaded city set was referenced.
    #[error("invalid point {id}: city set has {len} points")]
    InvalidPoint {
        /// The offending identifier.
        id: usize,
        /// Number of loaded points.
        len: usize,
    },

    /// A tour stopped being a permutation after an operator ran.
    #[error("permutation invariant violated after {operator}: {detail}")]
    PermutationInvariantViolation {
        /// Operator that produced the tour.
        operator: &'static str,
        /// What was wrong with the sequence.
        detail: String,
    },

    /// The city source supplied unusable data.
    #[error("city source error: {message}")]
    CitySource {
        /// Description of the problem.
        message: String,
    },

    /// Reading city data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SsgaError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SsgaError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn city_source(message: impl Into<String>) -> Self {
        SsgaError::CitySource {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SsgaError::config("pop_size must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error: pop_size must be at least 1"
        );

        let err = SsgaError::InvalidPoint { id: 7, len: 5 };
        assert_eq!(err.to_string(), "invalid point 7: city set has 5 points");

        let err = SsgaError::PermutationInvariantViolation {
            operator: "order_crossover",
            detail: "city 3 appears twice".into(),
        };
        assert!(err.to_string().contains("order_crossover"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: SsgaError = io.into();
        assert!(matches!(err, SsgaError::Io(_)));
    }
}
