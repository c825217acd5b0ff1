//! Seedable random number generation.
//!
//! The engine never reaches for a thread-local or unseeded generator; every
//! operator receives an explicit `&mut R: Rng`. [`create_rng`] is the one
//! place the crate picks a concrete generator.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generator type used by [`create_rng`].
pub type SsgaRng = StdRng;

/// Creates a deterministic generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> SsgaRng {
    StdRng::seed_from_u64(seed)
}
