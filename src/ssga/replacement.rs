//! Steady-state partial replacement.
//!
//! Offspring compete one-for-one with the weakest members: the best
//! offspring against the worst member, the second best against the second
//! worst, and so on. An offspring only enters if it is no longer than the
//! member it displaces; otherwise it is discarded and the member survives.
//! Because both lists are sorted, the first rejection ends the pass.

use super::population::Population;
use crate::tsp::Tour;

/// What one replacement pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplacementOutcome {
    /// Offspring that took a slot.
    pub replaced: usize,
    /// Offspring discarded because they were longer than their slot.
    pub rejected: usize,
}

/// Merges evaluated `offspring` into `population`.
///
/// Population size is unchanged. At most `offspring.len()` members (capped
/// at the population size) are displaced; any surplus offspring count as
/// rejected.
pub fn replace_weakest(population: &mut Population, mut offspring: Vec<Tour>) -> ReplacementOutcome {
    let total = offspring.len();
    offspring.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
    let slots = population.weakest_indices(total);

    let mut replaced = 0;
    for (child, slot) in offspring.into_iter().zip(slots) {
        let incumbent = population.tours()[slot].fitness();
        if child.fitness() > incumbent {
            break;
        }
        population.replace(slot, child);
        replaced += 1;
    }

    ReplacementOutcome {
        replaced,
        rejected: total - replaced,
    }
}
