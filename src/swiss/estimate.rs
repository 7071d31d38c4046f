//! Attendance estimation from an observed record histogram.

use serde::Serialize;
use tracing::{debug, trace};

use super::record::{Record, RecordBin};
use super::triangle::{Distribution, deviation, triangle};
use crate::error::EstimateError;

/// Field size used to turn the lattice into per-record shares.
pub const REFERENCE_FIELD: u64 = 10_000;

/// Below this many observed players, a candidate from the worst bucket is
/// accepted as-is (preliminary and top-cut-only events).
pub const SMALL_EVENT_THRESHOLD: u64 = 32;

/// Estimated attendance of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwissEstimate {
    pub estimated_players: u64,
    pub rounds: u32,
    /// Modelled distribution for `estimated_players`.
    pub theoretical_distribution: Distribution,
    pub observed_total: u64,
    pub observed_distribution: Distribution,
    /// Whether a zero-deviation candidate was found.
    pub exact: bool,
    /// Absolute deviation between the two distributions over observed buckets.
    pub deviation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    players: u64,
    deviation: u64,
}

/// Estimate total attendance from `bins`.
///
/// # Errors
///
/// Fails when a bin label is not `<wins>-<losses>` or implies more than
/// [`MAX_ROUNDS`](super::MAX_ROUNDS) rounds, when bins disagree on the number
/// of rounds, when counts overflow, or when there are no bins at all. An
/// estimate that could not be reconciled exactly is still returned, with
/// `exact == false`.
pub fn estimate(bins: &[RecordBin]) -> Result<SwissEstimate, EstimateError> {
    let observed = observe(bins)?;
    let buckets: Vec<(Record, u64)> = observed.iter().map(|(record, count)| (*record, *count)).collect();
    let Some(&(best_record, _)) = buckets.first() else {
        return Err(EstimateError::EmptyHistogram);
    };
    let rounds = best_record.rounds();
    let total = buckets
        .iter()
        .try_fold(0u64, |acc, (_, count)| acc.checked_add(*count))
        .ok_or_else(|| EstimateError::CountOverflow(best_record.to_string()))?;
    let reference = triangle(REFERENCE_FIELD, rounds);

    let worst = buckets.len() - 1;
    let mut best: Option<Candidate> = None;

    for idx in buckets.len().saturating_sub(2)..buckets.len() {
        let (record, count) = buckets[idx];
        let share = reference.get(&record).copied().unwrap_or(0);
        if count == 0 || share == 0 {
            trace!(%record, count, share, "bucket cannot back-solve a field size");
            continue;
        }

        let players = u64::try_from((u128::from(count) * u128::from(REFERENCE_FIELD)).div_ceil(u128::from(share)))
            .map_err(|_| EstimateError::CountOverflow(record.to_string()))?;
        let mut candidate = Candidate { players, deviation: deviation(&triangle(players, rounds), &buckets) };
        if idx == worst && total < SMALL_EVENT_THRESHOLD {
            candidate.deviation = 0;
        }
        debug!(%record, players, deviation = candidate.deviation, "back-solved candidate");

        if candidate.deviation == 0 {
            return Ok(finish(candidate.players, rounds, observed, true));
        }
        if best.is_none_or(|b| candidate.deviation < b.deviation) {
            best = Some(candidate);
        }
    }

    let Some(best) = best else {
        debug!(total, "no usable candidate, falling back to observed total");
        return Ok(finish(total, rounds, observed, false));
    };

    if buckets.len() > 2 {
        let interior = &buckets[1..worst];
        for players in (1..=best.players).rev() {
            if deviation(&triangle(players, rounds), interior) == 0 {
                debug!(players, from = best.players, "interior buckets reconciled");
                return Ok(finish(players, rounds, observed, true));
            }
        }
    }

    debug!(players = best.players, deviation = best.deviation, "estimate is approximate");
    Ok(finish(best.players, rounds, observed, false))
}

/// Parse and merge bins, checking they all share one round count.
fn observe(bins: &[RecordBin]) -> Result<Distribution, EstimateError> {
    let mut observed = Distribution::new();
    for bin in bins {
        let record = bin.parse()?;
        let count = observed.entry(record).or_insert(0);
        *count = count.checked_add(bin.count).ok_or_else(|| EstimateError::CountOverflow(record.to_string()))?;
    }

    let Some(expected) = observed.keys().next().map(|r| r.rounds()) else {
        return Err(EstimateError::EmptyHistogram);
    };
    if let Some(record) = observed.keys().find(|r| r.rounds() != expected) {
        return Err(EstimateError::InconsistentRounds { record: record.to_string(), expected, found: record.rounds() });
    }
    Ok(observed)
}

fn finish(players: u64, rounds: u32, observed: Distribution, exact: bool) -> SwissEstimate {
    let theoretical = triangle(players, rounds);
    let buckets: Vec<(Record, u64)> = observed.iter().map(|(record, count)| (*record, *count)).collect();
    SwissEstimate {
        estimated_players: players,
        rounds,
        deviation: deviation(&theoretical, &buckets),
        theoretical_distribution: theoretical,
        observed_total: observed.values().sum(),
        observed_distribution: observed,
        exact,
    }
}
