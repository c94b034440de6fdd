//! Judge rotation.
//!
//! Everyone judges once before anyone judges twice; after that the
//! least-recently-judged players are eligible, ties broken at random.

use rand::Rng;

use crate::domain::sampling::choose_one;
use crate::errors::domain::DomainError;

/// Judging history of one active player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeHistory {
    pub player_id: i64,
    /// Round number of the latest round this player judged
    pub last_judged_round: Option<i32>,
}

/// Select the next judge among the given active players.
///
/// An empty candidate list is a caller bug and yields `DomainError::Invariant`.
pub fn select_next_judge<R>(candidates: &[JudgeHistory], rng: &mut R) -> Result<i64, DomainError>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(DomainError::invariant(
            "judge rotation invoked with no active players",
        ));
    }

    let never_judged: Vec<i64> = candidates
        .iter()
        .filter(|c| c.last_judged_round.is_none())
        .map(|c| c.player_id)
        .collect();

    let eligible = if never_judged.is_empty() {
        let oldest = candidates
            .iter()
            .filter_map(|c| c.last_judged_round)
            .min()
            .ok_or_else(|| DomainError::invariant("judge history lost its rounds"))?;
        candidates
            .iter()
            .filter(|c| c.last_judged_round == Some(oldest))
            .map(|c| c.player_id)
            .collect()
    } else {
        never_judged
    };

    choose_one(&eligible, rng)
        .ok_or_else(|| DomainError::invariant("judge rotation produced no eligible player"))
}
