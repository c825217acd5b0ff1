//! Steady-state genetic algorithm for the TSP.
//!
//! Each generation produces a small batch of offspring that compete with
//! the weakest members of a fixed-size population, instead of replacing
//! the whole generation at once.
//!
//! # Key Types
//!
//! - [`SsgaConfig`]: Run parameters (sizes, rates, strategies, seed)
//! - [`SsgaRunner`]: Executes the steady-state loop, one [`step`](SsgaRunner::step) per generation
//! - [`SsgaResult`]: Best tour and per-generation history
//! - [`Population`]: Fixed-size collection of tours with ranking and diversity
//!
//! # Strategies
//!
//! - [`Selection`]: Truncation, elite plus random, or diversified elitism
//! - [`MutationKind`]: Swap or inversion
//! - [`RateSchedule`]: Diversity feedback, linear decay, or a fixed rate
//!
//! # Submodules
//!
//! - [`operators`]: Order crossover (OX) and permutation mutations
//!
//! # References
//!
//! - Syswerda (1991), *A Study of Reproduction in Generational and Steady-State Genetic Algorithms*
//! - Davis (1985), *Applying Adaptive Algorithms to Epistatic Domains* (order crossover)

mod config;
pub mod operators;
mod population;
mod rate;
mod replacement;
mod runner;
mod selection;

pub use config::SsgaConfig;
pub use operators::MutationKind;
pub use population::Population;
pub use rate::{RateContext, RateSchedule};
pub use replacement::{replace_weakest, ReplacementOutcome};
pub use runner::{Phase, RunState, SsgaResult, SsgaRunner};
pub use selection::Selection;
