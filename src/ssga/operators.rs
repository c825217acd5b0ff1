//! Permutation-preserving variation operators on [`Tour`]s.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): Davis (1985), keeps a segment of one parent
//!   in place and the relative order of the other
//!
//! # Mutation
//!
//! - [`swap_mutation`]: exchange two distinct positions, O(1)
//! - [`inversion_mutation`]: reverse a random segment (2-opt move), O(n)
//!
//! Both kinds are applied per offspring with probability `rate` through
//! [`mutate`].
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use crate::tsp::Tour;
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX).
///
/// Draws cut points `i <= j` and builds two children: the first keeps
/// `parent1[i..j]` in place and fills the rest from `parent2`, the second
/// swaps the roles. See [`order_crossover_at`].
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn order_crossover<R: Rng>(parent1: &Tour, parent2: &Tour, rng: &mut R) -> (Tour, Tour) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    if n < 2 {
        return (parent1.clone(), parent2.clone());
    }

    let (start, end) = random_cut_points(n, rng);
    (
        order_crossover_at(parent1, parent2, start, end),
        order_crossover_at(parent2, parent1, start, end),
    )
}

/// Builds one OX child for the cut points `start..end` (`start <= end <= n`).
///
/// 1. Copy `template[start..end]` into the child at the same positions.
/// 2. Walk `donor` circularly from position `end`, placing every city not
///    already copied into the child's free positions, also circularly from
///    `end`.
///
/// Every city appears exactly once by construction. An empty segment
/// (`start == end`) yields a copy of `donor`.
///
/// # Panics
/// Panics if `start > end`, `end > n`, or the parents differ in length.
pub fn order_crossover_at(template: &Tour, donor: &Tour, start: usize, end: usize) -> Tour {
    let template = template.cities();
    let donor = donor.cities();
    let n = template.len();
    assert_eq!(n, donor.len(), "parents must have equal length");
    assert!(start <= end && end <= n, "invalid cut points {start}..{end} for n={n}");

    if n == 0 {
        return Tour::new(Vec::new());
    }

    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in start..end {
        child[i] = template[i];
        in_segment[template[i]] = true;
    }

    let mut pos = end % n;
    for offset in 0..n {
        let city = donor[(end + offset) % n];
        if !in_segment[city] {
            child[pos] = city;
            pos = (pos + 1) % n;
        }
    }

    Tour::new(child)
}

/// Picks cut points `start <= end` within `0..=n`.
pub fn random_cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..=n);
    let b = rng.random_range(0..=n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Mutation
// ============================================================================

/// Which perturbation [`mutate`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationKind {
    /// Exchange two distinct positions.
    #[default]
    Swap,
    /// Reverse the segment between two distinct positions.
    Inversion,
}

impl MutationKind {
    /// Operator name used in invariant violation reports.
    pub fn name(self) -> &'static str {
        match self {
            MutationKind::Swap => "swap_mutation",
            MutationKind::Inversion => "inversion_mutation",
        }
    }
}

/// With probability `rate`, applies one `kind` perturbation to `tour`.
///
/// `tour` must be a fresh offspring, not a population member. Returns
/// whether the tour was perturbed.
pub fn mutate<R: Rng>(tour: &mut Tour, rate: f64, kind: MutationKind, rng: &mut R) -> bool {
    if rng.random_range(0.0..1.0) >= rate {
        return false;
    }
    match kind {
        MutationKind::Swap => swap_mutation(tour, rng),
        MutationKind::Inversion => inversion_mutation(tour, rng),
    }
    tour.len() >= 2
}

/// Swap mutation: exchange two distinct random positions.
pub fn swap_mutation<R: Rng>(tour: &mut Tour, rng: &mut R) {
    if let Some((i, j)) = distinct_positions(tour.len(), rng) {
        tour.swap(i, j);
    }
}

/// Inversion mutation: reverse the segment between two distinct positions.
pub fn inversion_mutation<R: Rng>(tour: &mut Tour, rng: &mut R) {
    if let Some((i, j)) = distinct_positions(tour.len(), rng) {
        tour.reverse_segment(i.min(j), i.max(j));
    }
}

/// Two distinct positions in `0..n`, uniformly; `None` when `n < 2`.
fn distinct_positions<R: Rng>(n: usize, rng: &mut R) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    Some((i, j))
}

// ============================================================================
// Tests
// ============================================================================
