//! Halving lattice for swiss record distributions.
//!
//! Level 1 holds every entrant. Each round, every cell splits in half: the
//! winners (rounded up) stay in the same loss column, the losers (rounded
//! down) move one column right. Cell `y` of level `x` therefore gets
//!
//! ```text
//! floor(level[x-1][y-1] / 2) + ceil(level[x-1][y] / 2)
//! ```
//!
//! with missing parents counted as zero. After `N` rounds, cell `y` of the
//! final level holds the expected number of `(N-y)-y` records. This is an
//! approximation of swiss pairings, not a simulation of them.

use std::collections::BTreeMap;

use super::record::Record;

/// Expected (or observed) player count per record, best record first.
pub type Distribution = BTreeMap<Record, u64>;

/// Rounds a swiss event of `players` entrants is usually run for.
pub fn rounds_for_players(players: u64) -> u32 {
    match players {
        p if p > 410 => 10,
        p if p > 226 => 9,
        0 | 1 => 0,
        // ceil(log2(p))
        p => u64::BITS - (p - 1).leading_zeros(),
    }
}

/// Model the final record distribution of `players` entrants after `rounds`.
///
/// Every level is rebuilt from integer cells; there is no closed form that can
/// be adjusted incrementally for a different `players`.
pub fn triangle(players: u64, rounds: u32) -> Distribution {
    let mut level: Vec<u64> = vec![players];

    for width in 2..=(rounds as usize + 1) {
        level = (0..width)
            .map(|y| {
                let losers = if y > 0 { level[y - 1] / 2 } else { 0 };
                let winners = level.get(y).map_or(0, |cell| cell.div_ceil(2));
                losers + winners
            })
            .collect();
    }

    level.into_iter().enumerate().map(|(y, count)| (Record::new(rounds - y as u32, y as u32), count)).collect()
}

/// [`triangle`] with the round count implied by the field size.
pub fn triangle_for(players: u64) -> Distribution {
    triangle(players, rounds_for_players(players))
}

/// Sum of absolute differences between `theoretical` and each `observed`
/// bucket. Records missing from `theoretical` count as zero; the sum
/// saturates at `u64::MAX`.
pub fn deviation(theoretical: &Distribution, observed: &[(Record, u64)]) -> u64 {
    observed
        .iter()
        .map(|(record, count)| theoretical.get(record).copied().unwrap_or(0).abs_diff(*count))
        .fold(0, u64::saturating_add)
}
