//! Swiss-tournament attendance estimation.
//!
//! Event feeds often publish only part of the field (top finishers, or
//! players above some record). The shape of the published win-loss histogram
//! still says a lot about how many players entered:
//!
//! ```text
//! observed bins ──▶ rounds N ──▶ reference lattice (10,000 players)
//!                                   │  share of the field per record
//!                                   v
//!                   candidates P from the two worst buckets
//!                                   │  rebuild lattice(P, N), compare
//!                                   v
//!                   exact match? ── no ──▶ bounded downward search
//!                                   │       (interior buckets only)
//!                                   v
//!                              SwissEstimate
//! ```
//!
//! - `record.rs`: `W-L` record labels and input bins.
//! - `triangle.rs`: the halving lattice that models the record distribution.
//! - `estimate.rs`: candidate back-solving and search.

#[path = "swiss/estimate.rs"]
mod estimate;
#[path = "swiss/record.rs"]
mod record;
#[path = "swiss/triangle.rs"]
mod triangle;

#[cfg(test)]
#[path = "swiss/tests.rs"]
mod tests;

pub use estimate::{REFERENCE_FIELD, SMALL_EVENT_THRESHOLD, SwissEstimate, estimate};
pub use record::{MAX_ROUNDS, Record, RecordBin};
pub use triangle::{Distribution, deviation, rounds_for_players, triangle, triangle_for};
