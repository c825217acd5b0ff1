//! Parent selection.
//!
//! Every strategy returns a batch of population indices. Within a batch no
//! member repeats unless more parents are requested than the population
//! holds, in which case the batch cycles through the distinct picks again.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Carbonell & Goldstein (1998), "The Use of MMR, Diversity-Based
//!   Reranking" (greedy relevance/novelty trade-off)

use super::population::Population;
use rand::seq::index;
use rand::Rng;

/// Score ties closer than this fall through to the tie-breakers.
const SCORE_EPSILON: f64 = 1e-12;

/// Selection strategy for choosing parents.
///
/// All strategies assume minimization (shorter tour = fitter).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Plain truncation: the `k` shortest tours.
    ///
    /// Strongest pressure, and prone to picking near-duplicates once the
    /// population starts to converge.
    Truncation,

    /// The best `elite_fraction` of the batch by rank, the rest drawn
    /// uniformly without replacement from the remaining members.
    EliteRandom {
        /// Share of the batch filled by rank, in `(0, 1]`.
        elite_fraction: f64,
    },

    /// Diversified elitism.
    ///
    /// The pool is the best `elite_fraction` of the population (never
    /// smaller than the batch). Parents are picked greedily from the pool:
    /// first the shortest tour, then repeatedly the candidate maximizing
    ///
    /// `(1 - diversity_weight) * quality + diversity_weight * novelty`
    ///
    /// where `quality` is the candidate's length rescaled to `[0, 1]` within
    /// the pool (1 = shortest) and `novelty` is its edge distance to the
    /// closest already chosen parent, divided by the city count. Ties go to
    /// the higher novelty, then to the lower population index.
    DiversifiedElitism {
        /// Share of the population forming the elite pool, in `(0, 1]`.
        elite_fraction: f64,
        /// Weight of novelty against quality, in `[0, 1]`.
        diversity_weight: f64,
    },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::DiversifiedElitism {
            elite_fraction: 0.5,
            diversity_weight: 0.5,
        }
    }
}

impl Selection {
    /// Selects `n_parents` indices from an evaluated population.
    pub fn select<R: Rng>(&self, population: &Population, n_parents: usize, rng: &mut R) -> Vec<usize> {
        if n_parents == 0 || population.is_empty() {
            return Vec::new();
        }
        let ranked = population.ranked_indices();
        let k = n_parents.min(ranked.len());

        let distinct = match *self {
            Selection::Truncation => ranked[..k].to_vec(),
            Selection::EliteRandom { elite_fraction } => {
                elite_random(&ranked, k, elite_fraction, rng)
            }
            Selection::DiversifiedElitism {
                elite_fraction,
                diversity_weight,
            } => diversified(population, &ranked, k, elite_fraction, diversity_weight),
        };

        distinct.iter().copied().cycle().take(n_parents).collect()
    }

    /// Checks the strategy parameters.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Selection::Truncation => Ok(()),
            Selection::EliteRandom { elite_fraction } => check_fraction("elite_fraction", elite_fraction),
            Selection::DiversifiedElitism {
                elite_fraction,
                diversity_weight,
            } => {
                check_fraction("elite_fraction", elite_fraction)?;
                if (0.0..=1.0).contains(&diversity_weight) {
                    Ok(())
                } else {
                    Err(format!("diversity_weight must be in [0, 1], got {diversity_weight}"))
                }
            }
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), String> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(format!("{name} must be in (0, 1], got {value}"))
    }
}

/// Top `elite_fraction * k` by rank (at least one), rest uniformly at random.
fn elite_random<R: Rng>(ranked: &[usize], k: usize, elite_fraction: f64, rng: &mut R) -> Vec<usize> {
    let elite_count = ((k as f64 * elite_fraction).round() as usize).clamp(1, k);
    let mut chosen = ranked[..elite_count].to_vec();

    let rest = &ranked[elite_count..];
    let extra = k - elite_count;
    for i in index::sample(rng, rest.len(), extra) {
        chosen.push(rest[i]);
    }
    chosen
}

/// Greedy quality/novelty selection over the elite pool.
fn diversified(
    population: &Population,
    ranked: &[usize],
    k: usize,
    elite_fraction: f64,
    diversity_weight: f64,
) -> Vec<usize> {
    let size = ranked.len();
    let pool_size = ((size as f64 * elite_fraction).ceil() as usize).clamp(k, size);
    let pool = &ranked[..pool_size];
    let tours = population.tours();
    let n = population.point_count().max(1) as f64;

    let best = tours[pool[0]].fitness();
    let worst = tours[pool[pool_size - 1]].fitness();
    let spread = worst - best;
    let quality: Vec<f64> = pool
        .iter()
        .map(|&i| {
            let f = tours[i].fitness();
            if !spread.is_finite() {
                if f.is_finite() {
                    1.0
                } else {
                    0.0
                }
            } else if spread <= 0.0 {
                1.0
            } else {
                (worst - f) / spread
            }
        })
        .collect();

    let mut chosen = Vec::with_capacity(k);
    let mut taken = vec![false; pool_size];
    let mut novelty = vec![1.0f64; pool_size];

    chosen.push(pool[0]);
    taken[0] = true;
    let mut last = pool[0];

    while chosen.len() < k {
        for (slot, &candidate) in pool.iter().enumerate() {
            if !taken[slot] {
                let d = tours[candidate].edge_distance(&tours[last]) as f64 / n;
                novelty[slot] = novelty[slot].min(d);
            }
        }

        let mut pick: Option<(usize, f64)> = None;
        for slot in 0..pool_size {
            if taken[slot] {
                continue;
            }
            let score = (1.0 - diversity_weight) * quality[slot] + diversity_weight * novelty[slot];
            let better = match pick {
                None => true,
                Some((best_slot, best_score)) => {
                    if score > best_score + SCORE_EPSILON {
                        true
                    } else if score + SCORE_EPSILON < best_score {
                        false
                    } else if novelty[slot] != novelty[best_slot] {
                        novelty[slot] > novelty[best_slot]
                    } else {
                        pool[slot] < pool[best_slot]
                    }
                }
            };
            if better {
                pick = Some((slot, score));
            }
        }

        let Some((slot, _)) = pick else { break };
        taken[slot] = true;
        last = pool[slot];
        chosen.push(last);
    }
    chosen
}
