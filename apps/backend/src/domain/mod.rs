//! Pure game logic: no I/O, no database, no clocks.
//!
//! Services load state, call into these functions with a seeded RNG, and
//! persist the result.

pub mod judge;
pub mod sampling;
pub mod scoring;
pub mod seed_derivation;

pub use judge::{select_next_judge, JudgeHistory};
pub use sampling::{assign_round_robin, choose_one, sample_without_replacement};
pub use scoring::{tally_wins, winner_at_threshold};
pub use seed_derivation::{derive_round_seed, round_rng, SeedPurpose};
