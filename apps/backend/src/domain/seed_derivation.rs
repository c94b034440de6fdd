//! RNG seed derivation utilities for deterministic game behavior.
//!
//! Every random choice a round makes flows from the game's `rng_seed`, so a
//! round re-created after a crash draws exactly what the first attempt drew.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Which draw of a round a seed is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPurpose {
    Prompt,
    Judge,
    Deal,
}

impl SeedPurpose {
    fn offset(self) -> u64 {
        match self {
            SeedPurpose::Prompt => 1,
            SeedPurpose::Judge => 2,
            SeedPurpose::Deal => 3,
        }
    }
}

/// Derive a seed for one purpose of one round.
///
/// Unique per (game seed, round, purpose); the SplitMix64 finaliser spreads
/// neighbouring inputs across the whole output space.
pub fn derive_round_seed(game_seed: i64, round_no: i32, purpose: SeedPurpose) -> u64 {
    // Cast i64 to u64 for RNG (sign doesn't matter for seed)
    let base = game_seed as u64;

    let mut z = base
        .wrapping_add((round_no as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(purpose.offset().wrapping_mul(0xD1B5_4A32_D192_ED03));
    z ^= z >> 30;
    z = z.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded generator for one purpose of one round.
pub fn round_rng(game_seed: i64, round_no: i32, purpose: SeedPurpose) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_round_seed(game_seed, round_no, purpose))
}
