//! Card sampling and hand assignment.
//!
//! Pure functions: the caller supplies the candidate pool and a seeded RNG,
//! and gets back which card goes to which player.

use std::collections::BTreeMap;

use rand::seq::index;
use rand::Rng;

/// Uniform random sample of `amount` distinct items, in random order.
///
/// Returns the whole pool (shuffled) when `amount` exceeds its size.
pub fn sample_without_replacement<T, R>(pool: &[T], amount: usize, rng: &mut R) -> Vec<T>
where
    T: Copy,
    R: Rng + ?Sized,
{
    let amount = amount.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Pick one item uniformly at random.
pub fn choose_one<T, R>(pool: &[T], rng: &mut R) -> Option<T>
where
    T: Copy,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        None
    } else {
        Some(pool[rng.random_range(0..pool.len())])
    }
}

/// Distribute `cards` round-robin over players, each taking at most what
/// they still need.
///
/// Passes go over `needs` in order handing out one card per player per
/// pass, so a short supply is spread as evenly as possible. Every player in
/// `needs` appears in the result, possibly with an empty list.
pub fn assign_round_robin(cards: &[i64], needs: &[(i64, usize)]) -> BTreeMap<i64, Vec<i64>> {
    let mut out: BTreeMap<i64, Vec<i64>> = needs.iter().map(|(p, _)| (*p, Vec::new())).collect();
    let mut supply = cards.iter().copied();

    let max_need = needs.iter().map(|(_, n)| *n).max().unwrap_or(0);
    'passes: for pass in 0..max_need {
        for (player_id, need) in needs {
            if *need <= pass {
                continue;
            }
            let Some(card) = supply.next() else {
                break 'passes;
            };
            if let Some(hand) = out.get_mut(player_id) {
                hand.push(card);
            }
        }
    }
    out
}
