//! Win tallies.

use std::collections::BTreeMap;

/// Rounds won per player, from the winners of ended rounds.
pub fn tally_wins(round_winners: &[i64]) -> BTreeMap<i64, u32> {
    let mut tally = BTreeMap::new();
    for winner in round_winners {
        *tally.entry(*winner).or_insert(0) += 1;
    }
    tally
}

/// The player whose tally reached `threshold`, if any.
///
/// Wins are awarded one round at a time, so at most one player can cross
/// the threshold on a given evaluation; should several qualify the highest
/// tally wins and the lowest player id breaks a tie.
pub fn winner_at_threshold(tally: &BTreeMap<i64, u32>, threshold: u32) -> Option<i64> {
    tally
        .iter()
        .filter(|(_, wins)| **wins >= threshold)
        .max_by(|(a_id, a_wins), (b_id, b_wins)| a_wins.cmp(b_wins).then(b_id.cmp(a_id)))
        .map(|(player_id, _)| *player_id)
}
