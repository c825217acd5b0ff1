//! Mutation-rate adaptation.
//!
//! The driver calls [`RateSchedule::next_rate`] exactly once per generation,
//! after replacement, with the freshly measured population diversity. The
//! update is a plain function of its inputs; nothing observes the population.

use crate::error::{Result, SsgaError};

/// How the mutation rate evolves over a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateSchedule {
    /// Keeps the initial rate for the whole run.
    Fixed,

    /// Diversity feedback: raise the rate when the population converges,
    /// lower it when the population is spread out.
    ///
    /// - diversity `< low_water`: `rate * increase`
    /// - diversity `> high_water`: `rate * decrease`
    /// - otherwise unchanged
    ///
    /// The result is clamped to `[min_rate, max_rate]`.
    DiversityFeedback {
        /// Lower clamp bound.
        min_rate: f64,
        /// Upper clamp bound.
        max_rate: f64,
        /// Diversity below which the population counts as converging.
        low_water: f64,
        /// Diversity above which mutation is throttled.
        high_water: f64,
        /// Multiplicative step when converging (> 1).
        increase: f64,
        /// Multiplicative step when diverse (< 1).
        decrease: f64,
    },

    /// Linear decay from the initial rate towards `min_rate`:
    /// `max(min_rate, initial * (1 - generation / max_generations))`.
    LinearDecay {
        /// Floor of the decay.
        min_rate: f64,
    },
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::DiversityFeedback {
            min_rate: 0.01,
            max_rate: 0.5,
            low_water: 0.15,
            high_water: 0.45,
            increase: 1.5,
            decrease: 0.9,
        }
    }
}

/// Inputs to one rate update.
#[derive(Debug, Clone, Copy)]
pub struct RateContext {
    /// Rate used for the generation that just finished.
    pub current: f64,
    /// Rate configured at the start of the run.
    pub initial: f64,
    /// Population diversity after replacement, in `[0, 1]`.
    pub diversity: f64,
    /// Number of generations completed, including the one just finished.
    pub generation: usize,
    /// Generation budget.
    pub max_generations: usize,
}

impl RateSchedule {
    /// The band every adapted rate is clamped to, given the initial rate.
    pub fn bounds(&self, initial: f64) -> (f64, f64) {
        match *self {
            RateSchedule::Fixed => (initial, initial),
            RateSchedule::DiversityFeedback {
                min_rate, max_rate, ..
            } => (min_rate, max_rate),
            RateSchedule::LinearDecay { min_rate } => (min_rate.min(initial), initial.max(min_rate)),
        }
    }

    /// Rate to use for the first generation.
    pub fn initial_rate(&self, configured: f64) -> f64 {
        let (lo, hi) = self.bounds(configured);
        configured.clamp(lo, hi)
    }

    /// Rate for the next generation.
    ///
    /// Always inside [`bounds`](Self::bounds), including for non-finite
    /// inputs, which leave the clamped current rate in place.
    pub fn next_rate(&self, ctx: RateContext) -> f64 {
        let (lo, hi) = self.bounds(ctx.initial);
        let current = if ctx.current.is_finite() {
            ctx.current.clamp(lo, hi)
        } else {
            lo
        };
        let next = match *self {
            RateSchedule::Fixed => ctx.initial,
            RateSchedule::DiversityFeedback {
                low_water,
                high_water,
                increase,
                decrease,
                ..
            } => {
                if !ctx.diversity.is_finite() {
                    current
                } else if ctx.diversity < low_water {
                    current * increase
                } else if ctx.diversity > high_water {
                    current * decrease
                } else {
                    current
                }
            }
            RateSchedule::LinearDecay { min_rate } => {
                let progress = if ctx.max_generations == 0 {
                    1.0
                } else {
                    ctx.generation as f64 / ctx.max_generations as f64
                };
                (ctx.initial * (1.0 - progress)).max(min_rate)
            }
        };
        if next.is_finite() {
            next.clamp(lo, hi)
        } else {
            current
        }
    }

    /// Checks the schedule parameters.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(SsgaError::config(format!("{name} must be in [0, 1], got {v}")))
            }
        };
        match *self {
            RateSchedule::Fixed => Ok(()),
            RateSchedule::DiversityFeedback {
                min_rate,
                max_rate,
                low_water,
                high_water,
                increase,
                decrease,
            } => {
                unit("min_rate", min_rate)?;
                unit("max_rate", max_rate)?;
                unit("low_water", low_water)?;
                unit("high_water", high_water)?;
                if min_rate > max_rate {
                    return Err(SsgaError::config(format!(
                        "min_rate {min_rate} exceeds max_rate {max_rate}"
                    )));
                }
                if low_water > high_water {
                    return Err(SsgaError::config(format!(
                        "low_water {low_water} exceeds high_water {high_water}"
                    )));
                }
                if !(increase.is_finite() && increase > 0.0) {
                    return Err(SsgaError::config("increase factor must be positive"));
                }
                if !(decrease.is_finite() && decrease > 0.0) {
                    return Err(SsgaError::config("decrease factor must be positive"));
                }
                Ok(())
            }
            RateSchedule::LinearDecay { min_rate } => unit("min_rate", min_rate),
        }
    }
}
