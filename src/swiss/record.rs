use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::EstimateError;

/// Longest swiss event a record label may describe.
pub const MAX_ROUNDS: u32 = 20;

/// A final `wins-losses` record.
///
/// Records order by losses first, so within one event (constant rounds) the
/// best record sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    /// Rounds played to reach this record. Saturates instead of overflowing;
    /// parsed records never exceed [`MAX_ROUNDS`].
    pub fn rounds(self) -> u32 {
        self.wins.saturating_add(self.losses)
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.losses.cmp(&other.losses).then(other.wins.cmp(&self.wins))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

impl FromStr for Record {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EstimateError::MalformedRecordBin(s.to_string());
        let caps = regex!(r"^(\d+)-(\d+)$").captures(s.trim()).ok_or_else(malformed)?;
        let wins: u32 = caps[1].parse().map_err(|_| malformed())?;
        let losses: u32 = caps[2].parse().map_err(|_| malformed())?;
        let rounds = u64::from(wins) + u64::from(losses);
        if rounds > u64::from(MAX_ROUNDS) {
            return Err(EstimateError::TooManyRounds { record: s.trim().to_string(), rounds, max: MAX_ROUNDS });
        }
        Ok(Record { wins, losses })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One observed histogram bin, as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBin {
    pub record: String,
    pub count: u64,
}

impl RecordBin {
    pub fn new(record: impl Into<String>, count: u64) -> Self {
        Self { record: record.into(), count }
    }

    pub fn parse(&self) -> Result<Record, EstimateError> {
        self.record.parse()
    }
}
