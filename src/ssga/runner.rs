//! Steady-state evolutionary loop.
//!
//! [`SsgaRunner`] owns the population and the run state and advances them
//! one generation at a time:
//! select → crossover → mutate → evaluate → replace → adapt rate → record.
//!
//! The driver moves through [`Phase::Initializing`], [`Phase::Running`] and
//! [`Phase::Terminated`]. Cancellation is only observed between
//! generations, so the recorded history always describes whole generations.

use super::config::SsgaConfig;
use super::operators::{mutate, order_crossover};
use super::population::{evaluate_tours, Population};
use super::rate::RateContext;
use super::replacement::{replace_weakest, ReplacementOutcome};
use crate::error::{Result, SsgaError};
use crate::random::{create_rng, SsgaRng};
use crate::tsp::{DistanceMetric, Tour};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Histories are preallocated up to this many generations.
const HISTORY_PREALLOC_LIMIT: usize = 1 << 16;

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Population is being built.
    Initializing,
    /// Generations are being executed.
    Running,
    /// Generation budget reached or run cancelled.
    Terminated,
}

/// Mutable state of one run, owned by the driver.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Current lifecycle phase.
    pub phase: Phase,

    /// Generations completed so far.
    pub generation: usize,

    /// Mutation rate the next generation will use.
    pub mutation_rate: f64,

    /// Shortest tour observed so far. `None` before the first generation.
    pub best: Option<Tour>,

    /// Best length at the end of each generation.
    pub history: Vec<f64>,

    /// Population diversity at the end of each generation.
    pub diversity_history: Vec<f64>,

    /// Mutation rate used by each generation.
    pub rate_history: Vec<f64>,

    /// Offspring accepted into the population, over the whole run.
    pub replaced: usize,

    /// Offspring discarded by replacement, over the whole run.
    pub rejected: usize,
}

impl RunState {
    fn new(initial_rate: f64, max_generations: usize) -> Self {
        let capacity = max_generations.min(HISTORY_PREALLOC_LIMIT);
        Self {
            phase: Phase::Initializing,
            generation: 0,
            mutation_rate: initial_rate,
            best: None,
            history: Vec::with_capacity(capacity),
            diversity_history: Vec::with_capacity(capacity),
            rate_history: Vec::with_capacity(capacity),
            replaced: 0,
            rejected: 0,
        }
    }

    /// Length of the best tour so far.
    pub fn best_length(&self) -> Option<f64> {
        self.best.as_ref().and_then(Tour::cached_length)
    }
}

/// Result of an SSGA run, handed to reporting collaborators.
#[derive(Debug, Clone)]
pub struct SsgaResult {
    /// The shortest tour found during the entire run.
    pub best: Tour,

    /// Its closed length.
    pub best_length: f64,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best length at the end of each generation.
    pub history: Vec<f64>,

    /// Population diversity at the end of each generation.
    pub diversity_history: Vec<f64>,

    /// Mutation rate used by each generation.
    pub rate_history: Vec<f64>,

    /// Offspring accepted into the population.
    pub replaced: usize,

    /// Offspring discarded by replacement.
    pub rejected: usize,
}

impl SsgaResult {
    /// Best length rounded up to an integer cost.
    pub fn rounded_cost(&self) -> u64 {
        self.best_length.ceil() as u64
    }
}

/// Executes the steady-state GA.
///
/// # Usage
///
/// ```
/// use ssga_tsp::random::create_rng;
/// use ssga_tsp::ssga::{SsgaConfig, SsgaRunner};
/// use ssga_tsp::tsp::{cities::random_cities, Euclidean};
///
/// let mut rng = create_rng(42);
/// let metric = Euclidean::from_points(random_cities(12, &mut rng)).unwrap();
/// let config = SsgaConfig::default().with_input_size(12).with_max_generations(20);
///
/// let result = SsgaRunner::new(&metric, config, rng).unwrap().run().unwrap();
/// assert_eq!(result.history.len(), 20);
/// ```
pub struct SsgaRunner<'m, M: DistanceMetric + ?Sized, R: Rng> {
    metric: &'m M,
    config: SsgaConfig,
    rng: R,
    population: Population,
    state: RunState,
}

impl<'m, M: DistanceMetric + ?Sized> SsgaRunner<'m, M, SsgaRng> {
    /// Builds a runner seeded from `config.seed`, or from a random seed
    /// when none is set.
    pub fn from_config(metric: &'m M, config: SsgaConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::new(metric, config, create_rng(seed))
    }
}

impl<'m, M: DistanceMetric + ?Sized, R: Rng> SsgaRunner<'m, M, R> {
    /// Validates the configuration and builds a random initial population.
    pub fn new(metric: &'m M, config: SsgaConfig, mut rng: R) -> Result<Self> {
        Self::check_inputs(metric, &config)?;
        let population = Population::initialize(config.pop_size, config.input_size, &mut rng)?;
        Self::start(metric, config, rng, population)
    }

    /// Like [`new`](Self::new), but with a population supplied by the caller.
    ///
    /// The population must hold exactly `pop_size` valid tours.
    pub fn with_population(
        metric: &'m M,
        config: SsgaConfig,
        rng: R,
        population: Population,
    ) -> Result<Self> {
        Self::check_inputs(metric, &config)?;
        if population.len() != config.pop_size {
            return Err(SsgaError::config(format!(
                "seeded population has {} tours, pop_size is {}",
                population.len(),
                config.pop_size
            )));
        }
        for tour in population.tours() {
            tour.ensure_valid(config.input_size, "population initialization")?;
        }
        Self::start(metric, config, rng, population)
    }

    fn check_inputs(metric: &M, config: &SsgaConfig) -> Result<()> {
        config.validate()?;
        if metric.point_count() != config.input_size {
            return Err(SsgaError::city_source(format!(
                "metric covers {} points, input_size is {}",
                metric.point_count(),
                config.input_size
            )));
        }
        Ok(())
    }

    fn start(metric: &'m M, config: SsgaConfig, rng: R, mut population: Population) -> Result<Self> {
        let initial_rate = config.rate_schedule.initial_rate(config.mutation_rate);
        let mut state = RunState::new(initial_rate, config.max_generations);

        tracing::info!(
            input_size = config.input_size,
            pop_size = config.pop_size,
            max_generations = config.max_generations,
            offspring = config.offspring_count(),
            mutation_rate = initial_rate,
            "Initializing SSGA run"
        );
        population.evaluate(metric, config.parallel)?;
        state.phase = Phase::Running;

        Ok(Self {
            metric,
            config,
            rng,
            population,
            state,
        })
    }

    /// The current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The current run state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// The configuration in use.
    pub fn config(&self) -> &SsgaConfig {
        &self.config
    }

    /// Runs one generation.
    ///
    /// Returns `Ok(true)` while more generations remain. Any error is fatal
    /// for the run.
    pub fn step(&mut self) -> Result<bool> {
        if self.state.phase != Phase::Running {
            return Ok(false);
        }

        let n = self.config.input_size;
        let rate = self.state.mutation_rate;

        // Selection
        let parents = self
            .config
            .selection
            .select(&self.population, self.config.parent_count(), &mut self.rng);

        // Crossover and mutation draw all their random numbers here, before
        // any evaluation, so parallel evaluation cannot change the outcome.
        let target = self.config.offspring_count();
        let mut offspring: Vec<Tour> = Vec::with_capacity(target + 1);
        while offspring.len() < target {
            let (a, b) = distinct_pair(parents.len(), &mut self.rng);
            let p1 = &self.population.tours()[parents[a]];
            let p2 = &self.population.tours()[parents[b]];
            let (c1, c2) = order_crossover(p1, p2, &mut self.rng);
            for child in [c1, c2] {
                if offspring.len() < target {
                    child.ensure_valid(n, "order_crossover")?;
                    offspring.push(child);
                }
            }
        }
        for child in offspring.iter_mut() {
            if mutate(child, rate, self.config.mutation, &mut self.rng) {
                child.ensure_valid(n, self.config.mutation.name())?;
            }
        }

        // Evaluation
        evaluate_tours(&mut offspring, self.metric, self.config.parallel)?;

        // Replacement
        let ReplacementOutcome { replaced, rejected } =
            replace_weakest(&mut self.population, offspring);
        self.state.replaced += replaced;
        self.state.rejected += rejected;

        // Best so far
        let gen_best = self.population.best();
        let improved = match self.state.best_length() {
            Some(best) => gen_best.fitness() < best,
            None => true,
        };
        if improved {
            self.state.best = Some(gen_best.clone());
        }
        let best_length = self.state.best_length().unwrap_or(f64::INFINITY);

        // Rate adaptation
        let diversity = self.population.diversity();
        self.state.generation += 1;
        self.state.mutation_rate = self.config.rate_schedule.next_rate(RateContext {
            current: rate,
            initial: self.config.mutation_rate,
            diversity,
            generation: self.state.generation,
            max_generations: self.config.max_generations,
        });

        self.state.history.push(best_length);
        self.state.diversity_history.push(diversity);
        self.state.rate_history.push(rate);

        tracing::debug!(
            generation = self.state.generation,
            best_length,
            diversity,
            mutation_rate = rate,
            replaced,
            rejected,
            "Generation complete"
        );

        if self.state.generation >= self.config.max_generations {
            self.state.phase = Phase::Terminated;
            return Ok(false);
        }
        Ok(true)
    }

    /// Runs until the generation budget is exhausted.
    pub fn run(self) -> Result<SsgaResult> {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the best tour found so far.
    pub fn run_with_cancel(mut self, cancel: Option<Arc<AtomicBool>>) -> Result<SsgaResult> {
        let mut cancelled = false;
        while self.state.phase == Phase::Running {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    tracing::warn!(
                        generation = self.state.generation,
                        "SSGA run cancelled at generation boundary"
                    );
                    cancelled = true;
                    break;
                }
            }
            self.step()?;
        }
        Ok(self.finish(cancelled))
    }

    fn finish(mut self, cancelled: bool) -> SsgaResult {
        self.state.phase = Phase::Terminated;
        let best = match self.state.best.take() {
            Some(best) => best,
            None => self.population.best().clone(),
        };
        let best_length = best.fitness();

        tracing::info!(
            generations = self.state.generation,
            best_length,
            replaced = self.state.replaced,
            rejected = self.state.rejected,
            cancelled,
            "SSGA run terminated"
        );

        SsgaResult {
            best,
            best_length,
            generations: self.state.generation,
            cancelled,
            history: self.state.history,
            diversity_history: self.state.diversity_history,
            rate_history: self.state.rate_history,
            replaced: self.state.replaced,
            rejected: self.state.rejected,
        }
    }
}

/// Two distinct indices in `0..len`, or `(0, 0)` when `len < 2`.
fn distinct_pair<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
    if len < 2 {
        return (0, 0);
    }
    let a = rng.random_range(0..len);
    let mut b = rng.random_range(0..len - 1);
    if b >= a {
        b += 1;
    }
    (a, b)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssga::{MutationKind, RateSchedule, Selection};
    use crate::tsp::cities::random_cities;
    use crate::tsp::{DistanceMatrix, Euclidean, Point};

    /// Corners of a 2x2 square plus its center.
    fn square_with_center() -> Euclidean {
        Euclidean::from_points(vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 2.0, 0.0),
            Point::new(2, 2.0, 2.0),
            Point::new(3, 0.0, 2.0),
            Point::new(4, 1.0, 1.0),
        ])
        .unwrap()
    }

    fn random_instance(n: usize, seed: u64) -> Euclidean {
        let mut rng = create_rng(seed);
        Euclidean::from_points(random_cities(n, &mut rng)).unwrap()
    }

    fn is_non_increasing(history: &[f64]) -> bool {
        history.windows(2).all(|w| w[1] <= w[0])
    }

    #[test]
    fn test_square_with_center_converges() {
        let metric = square_with_center();
        let config = SsgaConfig::default()
            .with_input_size(5)
            .with_pop_size(20)
            .with_max_generations(50)
            .with_mutation_rate(0.05)
            .with_parents_percent(20);

        let result = SsgaRunner::new(&metric, config, create_rng(42))
            .unwrap()
            .run()
            .unwrap();

        // Three sides plus a detour through the center: 3 * 2 + 2 * sqrt(2).
        let optimum = 6.0 + 2.0 * 2f64.sqrt();
        assert!(
            (result.best_length - optimum).abs() < 1e-9,
            "expected {optimum}, got {}",
            result.best_length
        );
        assert_eq!(result.history.len(), 50);
        assert!(is_non_increasing(&result.history));
        assert_eq!(result.generations, 50);
        assert!(!result.cancelled);
        assert!(result.best.validate());
        assert_eq!(result.rounded_cost(), 9);
    }

    #[test]
    fn test_single_city_has_zero_length_every_generation() {
        let metric = Euclidean::from_points(vec![Point::new(0, 5.0, 5.0)]).unwrap();
        let config = SsgaConfig::default()
            .with_input_size(1)
            .with_pop_size(20)
            .with_max_generations(30);

        let result = SsgaRunner::new(&metric, config, create_rng(1))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.history, vec![0.0; 30]);
        assert_eq!(result.best.cities(), &[0]);
        assert_eq!(result.best_length, 0.0);
    }

    #[test]
    fn test_population_of_one() {
        let metric = random_instance(6, 4);
        let config = SsgaConfig::default()
            .with_input_size(6)
            .with_pop_size(1)
            .with_max_generations(25);
        let result = SsgaRunner::new(&metric, config, create_rng(4))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.history.len(), 25);
        assert!(is_non_increasing(&result.history));
    }

    #[test]
    fn test_invariants_hold_every_generation() {
        let metric = random_instance(15, 8);
        let config = SsgaConfig::default()
            .with_input_size(15)
            .with_pop_size(30)
            .with_max_generations(60)
            .with_mutation_rate(0.3)
            .with_parents_percent(50);
        let (lo, hi) = config.rate_schedule.bounds(config.mutation_rate);

        let mut runner = SsgaRunner::new(&metric, config, create_rng(8)).unwrap();
        let mut previous_best = f64::INFINITY;
        loop {
            let more = runner.step().unwrap();
            let pop = runner.population();
            assert_eq!(pop.len(), 30);
            assert!(pop.tours().iter().all(|t| t.validate() && t.len() == 15));

            let best = runner.state().best_length().unwrap();
            assert!(best <= previous_best);
            previous_best = best;

            let rate = runner.state().mutation_rate;
            assert!(rate >= lo && rate <= hi, "rate {rate} outside [{lo}, {hi}]");
            if !more {
                break;
            }
        }
        assert_eq!(runner.state().phase, Phase::Terminated);
        assert_eq!(runner.state().history.len(), 60);
        assert!(!runner.step().unwrap());
    }

    #[test]
    fn test_identical_seeds_give_identical_histories() {
        let metric = random_instance(20, 3);
        let config = SsgaConfig::default()
            .with_input_size(20)
            .with_pop_size(40)
            .with_max_generations(80);

        let a = SsgaRunner::new(&metric, config.clone(), create_rng(99))
            .unwrap()
            .run()
            .unwrap();
        let b = SsgaRunner::new(&metric, config, create_rng(99))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(a.history, b.history);
        assert_eq!(a.rate_history, b.rate_history);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_from_config_uses_seed() {
        let metric = random_instance(10, 6);
        let config = SsgaConfig::default()
            .with_input_size(10)
            .with_max_generations(30)
            .with_seed(5);
        let a = SsgaRunner::from_config(&metric, config.clone()).unwrap().run().unwrap();
        let b = SsgaRunner::new(&metric, config, create_rng(5)).unwrap().run().unwrap();
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_parallel_and_noout_do_not_change_result() {
        let metric = random_instance(18, 12);
        let config = SsgaConfig::default()
            .with_input_size(18)
            .with_pop_size(30)
            .with_max_generations(40);

        let base = SsgaRunner::new(&metric, config.clone(), create_rng(2))
            .unwrap()
            .run()
            .unwrap();
        let other = SsgaRunner::new(
            &metric,
            config.with_parallel(true).with_noout(true),
            create_rng(2),
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(base.history, other.history);
        assert_eq!(base.best, other.best);
    }

    #[test]
    fn test_improves_on_random_instance() {
        let metric = random_instance(25, 17);
        let config = SsgaConfig::default()
            .with_input_size(25)
            .with_pop_size(60)
            .with_max_generations(400)
            .with_parents_percent(30);

        let runner = SsgaRunner::new(&metric, config, create_rng(17)).unwrap();
        let initial_best = runner.population().best().fitness();
        let result = runner.run().unwrap();

        assert!(is_non_increasing(&result.history));
        assert!(
            result.best_length < initial_best * 0.8,
            "expected at least 20% improvement over {initial_best}, got {}",
            result.best_length
        );
        assert!(result.replaced > 0);
    }

    #[test]
    fn test_all_strategies_run() {
        let metric = random_instance(12, 21);
        for (selection, mutation, schedule) in [
            (Selection::Truncation, MutationKind::Swap, RateSchedule::Fixed),
            (
                Selection::EliteRandom { elite_fraction: 0.25 },
                MutationKind::Inversion,
                RateSchedule::LinearDecay { min_rate: 0.01 },
            ),
            (Selection::default(), MutationKind::Inversion, RateSchedule::default()),
        ] {
            let config = SsgaConfig::default()
                .with_input_size(12)
                .with_pop_size(24)
                .with_max_generations(40)
                .with_selection(selection)
                .with_mutation(mutation)
                .with_rate_schedule(schedule);
            let result = SsgaRunner::new(&metric, config, create_rng(21))
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(result.history.len(), 40, "{selection:?}");
            assert!(is_non_increasing(&result.history));
            assert!(result.best.validate());
        }
    }

    #[test]
    fn test_linear_decay_history() {
        let metric = random_instance(8, 2);
        let config = SsgaConfig::default()
            .with_input_size(8)
            .with_max_generations(10)
            .with_mutation_rate(0.1)
            .with_rate_schedule(RateSchedule::LinearDecay { min_rate: 0.01 });
        let result = SsgaRunner::new(&metric, config, create_rng(2))
            .unwrap()
            .run()
            .unwrap();
        assert!((result.rate_history[0] - 0.1).abs() < 1e-12);
        assert!((result.rate_history[5] - 0.05).abs() < 1e-12);
        assert!(result.rate_history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_cancellation_at_generation_boundary() {
        let metric = random_instance(10, 5);
        let config = SsgaConfig::default()
            .with_input_size(10)
            .with_max_generations(1000);
        let mut runner = SsgaRunner::new(&metric, config, create_rng(5)).unwrap();
        for _ in 0..3 {
            assert!(runner.step().unwrap());
        }

        let cancel = Arc::new(AtomicBool::new(true));
        let result = runner.run_with_cancel(Some(cancel)).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.generations, 3);
        assert_eq!(result.history.len(), 3);
        assert_eq!(result.best_length, *result.history.last().unwrap());
        assert!(result.best.validate());
    }

    #[test]
    fn test_cancelled_before_first_generation() {
        let metric = random_instance(10, 5);
        let config = SsgaConfig::default().with_input_size(10);
        let runner = SsgaRunner::new(&metric, config, create_rng(5)).unwrap();
        let initial_best = runner.population().best().fitness();

        let result = runner
            .run_with_cancel(Some(Arc::new(AtomicBool::new(true))))
            .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert!(result.history.is_empty());
        assert_eq!(result.best_length, initial_best);
    }

    #[test]
    fn test_cancellation_from_another_thread() {
        let metric = random_instance(30, 5);
        let config = SsgaConfig::default()
            .with_input_size(30)
            .with_max_generations(usize::MAX);
        let runner = SsgaRunner::new(&metric, config, create_rng(5)).unwrap();

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            cancel_clone.store(true, Ordering::Relaxed);
        });

        let result = runner.run_with_cancel(Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.history.len(), result.generations);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let metric = random_instance(5, 1);
        let config = SsgaConfig::default().with_input_size(5).with_parents_percent(0);
        let err = SsgaRunner::new(&metric, config, create_rng(1)).err().unwrap();
        assert!(matches!(err, SsgaError::Configuration { .. }));

        let config = SsgaConfig::default().with_input_size(5).with_mutation_rate(1.0);
        assert!(SsgaRunner::new(&metric, config, create_rng(1)).is_err());
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let metric = random_instance(5, 1);
        let config = SsgaConfig::default().with_input_size(6);
        let err = SsgaRunner::new(&metric, config, create_rng(1)).err().unwrap();
        assert!(matches!(err, SsgaError::CitySource { .. }));
    }

    #[test]
    fn test_seeded_population() {
        let metric = square_with_center();
        let config = SsgaConfig::default()
            .with_input_size(5)
            .with_pop_size(2)
            .with_max_generations(5);
        let seeded = Population::from_tours(
            vec![Tour::new(vec![0, 1, 2, 3, 4]), Tour::new(vec![0, 4, 1, 2, 3])],
            5,
        )
        .unwrap();
        let runner =
            SsgaRunner::with_population(&metric, config.clone(), create_rng(3), seeded).unwrap();
        let result = runner.run().unwrap();
        assert!((result.best_length - (6.0 + 2.0 * 2f64.sqrt())).abs() < 1e-9);

        let wrong_size = Population::from_tours(vec![Tour::identity(5)], 5).unwrap();
        assert!(SsgaRunner::with_population(&metric, config, create_rng(3), wrong_size).is_err());
    }

    #[test]
    fn test_asymmetric_matrix_metric() {
        // The cheap direction is 0 -> 1 -> 2 -> 3 -> 0.
        let mut rows = vec![vec![0.0; 4]; 4];
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    rows[a][b] = if b == (a + 1) % 4 { 1.0 } else { 10.0 };
                }
            }
        }
        let metric = DistanceMatrix::new(rows).unwrap();
        let config = SsgaConfig::default()
            .with_input_size(4)
            .with_pop_size(20)
            .with_max_generations(30);
        let result = SsgaRunner::new(&metric, config, create_rng(10))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.best_length, 4.0);
    }

    #[test]
    fn test_distinct_pair() {
        let mut rng = create_rng(1);
        for _ in 0..200 {
            let (a, b) = distinct_pair(5, &mut rng);
            assert_ne!(a, b);
            assert!(a < 5 && b < 5);
        }
        assert_eq!(distinct_pair(1, &mut rng), (0, 0));
    }
}
