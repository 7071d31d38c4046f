//! Event selection and per-event statistics.
//!
//! [`EventWindow`] picks events by format, type and date. Dates follow these
//! rules, with `interval` defaulting to [`DEFAULT_INTERVAL_DAYS`]:
//!
//! ```text
//! min only       [min, min + interval]
//! max (± min)    [max - interval, max], and >= min when given
//! neither        [today - interval, today]
//! explicit uids  interval ignored, min/max still apply
//! ```

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Uid;
use crate::error::EstimateError;
use crate::query::DeckCardRecord;
use crate::swiss::{RecordBin, SwissEstimate, estimate};

pub const DEFAULT_INTERVAL_DAYS: u64 = 14;

/// The event fields selection looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub uid: Uid,
    pub format: String,
    /// Event type, e.g. "Challenge" or "Preliminary".
    pub kind: String,
    pub date: NaiveDate,
}

/// Selection criteria for events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWindow {
    /// Accepted formats (case-insensitive); empty accepts all.
    pub formats: Vec<String>,
    /// Accepted event types (case-insensitive); empty accepts all.
    pub kinds: Vec<String>,
    pub interval_days: Option<u64>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Explicit events; empty means no uid restriction.
    pub uids: Vec<Uid>,
}

impl EventWindow {
    /// Inclusive date bounds relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let interval = if self.uids.is_empty() {
            Some(Days::new(self.interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS)))
        } else {
            None
        };

        match (self.min_date, self.max_date, interval) {
            (Some(min), None, Some(days)) => (Some(min), min.checked_add_days(days)),
            (min, Some(max), Some(days)) => {
                let from = max.checked_sub_days(days);
                (from.max(min), Some(max))
            }
            (None, None, Some(days)) => (today.checked_sub_days(days), Some(today)),
            (min, max, None) => (min, max),
        }
    }

    pub fn contains(&self, event: &EventSummary, today: NaiveDate) -> bool {
        let (from, to) = self.date_range(today);
        from.is_none_or(|d| event.date >= d)
            && to.is_none_or(|d| event.date <= d)
            && matches_any(&self.formats, &event.format)
            && matches_any(&self.kinds, &event.kind)
            && (self.uids.is_empty() || self.uids.contains(&event.uid))
    }

    /// Matching events, newest first, then by uid descending.
    pub fn select<'a>(&self, events: &'a [EventSummary], today: NaiveDate) -> Vec<&'a EventSummary> {
        let mut selected: Vec<&EventSummary> = events.iter().filter(|e| self.contains(e, today)).collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.uid.cmp(&a.uid)));
        debug!(selected = selected.len(), events = events.len(), "selected events");
        selected
    }
}

fn matches_any(accepted: &[String], value: &str) -> bool {
    accepted.is_empty() || accepted.iter().any(|a| a.eq_ignore_ascii_case(value))
}

/// Decks, archetypes and estimated attendance of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub event_uid: Uid,
    /// Published decklists.
    pub decks: usize,
    pub archetypes: usize,
    /// `None` when the event published no record histogram.
    pub attendance: Option<SwissEstimate>,
}

/// Compute [`EventStats`] for `event_uid` from all `records` and its `bins`.
pub fn event_stats(event_uid: Uid, records: &[DeckCardRecord], bins: &[RecordBin]) -> Result<EventStats, EstimateError> {
    let own = records.iter().filter(|r| r.event_uid == event_uid);
    let decks: BTreeSet<Uid> = own.clone().map(|r| r.deck_uid).collect();
    let archetypes: BTreeSet<Uid> = own.map(|r| r.archetype_uid).collect();
    let attendance = if bins.is_empty() { None } else { Some(estimate(bins)?) };

    Ok(EventStats { event_uid, decks: decks.len(), archetypes: archetypes.len(), attendance })
}
