//! Seeded random number generation.
//!
//! Every run owns exactly one generator created here. All randomness in the
//! engine (selection draws, migration shuffles, operator coin-flips) is
//! drawn from that single stream, so a fixed seed reproduces a run exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Creates the run generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates the run generator from an optional seed.
///
/// `None` draws a fresh seed from the operating system.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// In-place Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
