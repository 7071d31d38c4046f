//! Metagame aggregation over a filtered deck set.
//!
//! Shares are always relative to the *parent* population handed in (typically
//! every deck of one format within the event window), never to a global total:
//! an archetype's percentage is matched decks of that archetype over parent
//! decks of that archetype, and a card's percentage is matched decks playing
//! it over all parent decks.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::Uid;
use crate::events::EventSummary;
use crate::query::{Container, DeckCardRecord};

/// Matched decks of one archetype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeShare {
    pub archetype_uid: Uid,
    pub count: usize,
    /// Percent (0-100) of this archetype's parent decks that matched.
    pub percentage: f64,
}

/// Matched decks playing one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardShare {
    pub cardname: String,
    /// Distinct matched decks playing the card.
    pub count: usize,
    /// Percent (0-100) of parent decks.
    pub percentage: f64,
    /// Copies per deck playing it, summed over mainboard and sideboard.
    pub average: f64,
    pub containers: BTreeSet<Container>,
}

/// Summary of the decks accepted by a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    /// Matched decks.
    pub count: usize,
    /// Percent (0-100) of parent decks that matched.
    pub percentage: f64,
    /// Distinct archetypes among matched decks.
    pub unique: usize,
    /// Most matched archetype first, ties by uid.
    pub archetypes: Vec<ArchetypeShare>,
    /// Most played card first, then higher average, then name.
    pub cards: Vec<CardShare>,
}

#[derive(Default)]
struct Tally {
    parent: BTreeSet<Uid>,
    matched: BTreeSet<Uid>,
}

#[derive(Default)]
struct CardTally {
    decks: BTreeSet<Uid>,
    copies: u64,
    containers: BTreeSet<Container>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 * 100.0 }
}

/// Aggregate `accepted` decks against the `parent` records in one pass.
///
/// Accepted uids with no record in `parent` are not counted.
pub fn catalog(parent: &[DeckCardRecord], accepted: &BTreeSet<Uid>) -> Catalog {
    let mut by_archetype: BTreeMap<Uid, Tally> = BTreeMap::new();
    let mut by_card: BTreeMap<&str, CardTally> = BTreeMap::new();
    for record in parent {
        let tally = by_archetype.entry(record.archetype_uid).or_default();
        tally.parent.insert(record.deck_uid);
        if accepted.contains(&record.deck_uid) {
            tally.matched.insert(record.deck_uid);

            let card = by_card.entry(record.cardname.as_str()).or_default();
            card.decks.insert(record.deck_uid);
            card.copies += u64::from(record.quantity);
            card.containers.insert(record.container);
        }
    }

    let parent_decks: usize = by_archetype.values().map(|t| t.parent.len()).sum();
    let mut archetypes: Vec<ArchetypeShare> = by_archetype
        .iter()
        .filter(|(_, tally)| !tally.matched.is_empty())
        .map(|(&archetype_uid, tally)| ArchetypeShare {
            archetype_uid,
            count: tally.matched.len(),
            percentage: percent(tally.matched.len(), tally.parent.len()),
        })
        .collect();
    archetypes.sort_by(|a, b| b.count.cmp(&a.count).then(a.archetype_uid.cmp(&b.archetype_uid)));

    let mut cards: Vec<CardShare> = by_card
        .into_iter()
        .map(|(cardname, tally)| CardShare {
            cardname: cardname.to_string(),
            count: tally.decks.len(),
            percentage: percent(tally.decks.len(), parent_decks),
            average: tally.copies as f64 / tally.decks.len() as f64,
            containers: tally.containers,
        })
        .collect();
    cards.sort_by(|a, b| {
        b.count.cmp(&a.count).then(b.average.total_cmp(&a.average)).then_with(|| a.cardname.cmp(&b.cardname))
    });

    let count: usize = archetypes.iter().map(|a| a.count).sum();
    Catalog { count, percentage: percent(count, parent_decks), unique: archetypes.len(), archetypes, cards }
}

/// One [`catalog`] per format, keyed by lowercased format name.
///
/// Each record's format comes from its event in `events`; records of unknown
/// events are left out, so every format is its own parent population.
pub fn catalogs_by_format(
    events: &[EventSummary],
    parent: &[DeckCardRecord],
    accepted: &BTreeSet<Uid>,
) -> BTreeMap<String, Catalog> {
    let formats: BTreeMap<Uid, String> = events.iter().map(|e| (e.uid, e.format.to_lowercase())).collect();

    let mut partitions: BTreeMap<&str, Vec<DeckCardRecord>> = BTreeMap::new();
    for record in parent {
        match formats.get(&record.event_uid) {
            Some(format) => partitions.entry(format.as_str()).or_default().push(record.clone()),
            None => debug!(event_uid = record.event_uid, "record of unknown event left out"),
        }
    }

    partitions.into_iter().map(|(format, records)| (format.to_string(), catalog(&records, accepted))).collect()
}
