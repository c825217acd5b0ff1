//! SSGA configuration.
//!
//! [`SsgaConfig`] holds all parameters that control the steady-state loop.

use super::operators::MutationKind;
use super::rate::RateSchedule;
use super::selection::Selection;
use crate::error::{Result, SsgaError};

/// Configuration for the steady-state genetic algorithm.
///
/// # Defaults
///
/// ```
/// use ssga_tsp::ssga::SsgaConfig;
///
/// let config = SsgaConfig::default();
/// assert_eq!(config.pop_size, 50);
/// assert_eq!(config.max_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use ssga_tsp::ssga::{MutationKind, Selection, SsgaConfig};
///
/// let config = SsgaConfig::default()
///     .with_input_size(30)
///     .with_pop_size(200)
///     .with_parents_percent(10)
///     .with_selection(Selection::Truncation)
///     .with_mutation(MutationKind::Inversion)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SsgaConfig {
    /// Number of cities. Must match the metric the run is given.
    pub input_size: usize,

    /// Number of tours in the population. Constant for the whole run.
    pub pop_size: usize,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Initial per-offspring mutation probability, in `(0, 1)`.
    pub mutation_rate: f64,

    /// Share of the population (in percent, 1–100) produced as offspring
    /// and offered for replacement each generation.
    pub parents_percent: u32,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Mutation operator applied to offspring.
    pub mutation: MutationKind,

    /// How the mutation rate evolves between generations.
    pub rate_schedule: RateSchedule,

    /// Random seed used by [`SsgaRunner::from_config`](super::SsgaRunner::from_config).
    ///
    /// `None` draws a random seed.
    pub seed: Option<u64>,

    /// Whether to evaluate offspring in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature; results are identical
    /// either way.
    pub parallel: bool,

    /// Suppresses external reporting. The run result is unaffected.
    pub noout: bool,
}

impl Default for SsgaConfig {
    fn default() -> Self {
        Self {
            input_size: 10,
            pop_size: 50,
            max_generations: 100,
            mutation_rate: 0.1,
            parents_percent: 20,
            selection: Selection::default(),
            mutation: MutationKind::default(),
            rate_schedule: RateSchedule::default(),
            seed: None,
            parallel: false,
            noout: false,
        }
    }
}

impl SsgaConfig {
    /// Sets the number of cities.
    pub fn with_input_size(mut self, n: usize) -> Self {
        self.input_size = n;
        self
    }

    /// Sets the population size.
    pub fn with_pop_size(mut self, n: usize) -> Self {
        self.pop_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the initial mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the share of the population replaced per generation, in percent.
    pub fn with_parents_percent(mut self, percent: u32) -> Self {
        self.parents_percent = percent;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, mutation: MutationKind) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the mutation-rate schedule.
    pub fn with_rate_schedule(mut self, schedule: RateSchedule) -> Self {
        self.rate_schedule = schedule;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel offspring evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables or disables external reporting.
    pub fn with_noout(mut self, noout: bool) -> Self {
        self.noout = noout;
        self
    }

    /// Offspring produced per generation:
    /// `round(pop_size * parents_percent / 100)`, clamped to `1..=pop_size`.
    pub fn offspring_count(&self) -> usize {
        let raw = (self.pop_size as f64 * self.parents_percent as f64 / 100.0).round() as usize;
        raw.clamp(1, self.pop_size.max(1))
    }

    /// Parents selected per generation: the offspring count, at least 2.
    pub fn parent_count(&self) -> usize {
        self.offspring_count().max(2)
    }

    /// Validates the configuration.
    ///
    /// Returns [`SsgaError::Configuration`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(SsgaError::config("input_size must be at least 1"));
        }
        if self.pop_size == 0 {
            return Err(SsgaError::config("pop_size must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(SsgaError::config("max_generations must be at least 1"));
        }
        if !(self.mutation_rate > 0.0 && self.mutation_rate < 1.0) {
            return Err(SsgaError::config(format!(
                "mutation_rate must be in (0, 1), got {}",
                self.mutation_rate
            )));
        }
        if !(1..=100).contains(&self.parents_percent) {
            return Err(SsgaError::config(format!(
                "parents_percent must be in 1..=100, got {}",
                self.parents_percent
            )));
        }
        self.selection.validate().map_err(SsgaError::config)?;
        self.rate_schedule.validate()?;
        Ok(())
    }
}
