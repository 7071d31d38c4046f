//! Condition evaluation against decklist records.
//!
//! Each group is a conjunction checked against *one* record at a time: a deck
//! passes a group when some single card record satisfies every record-level
//! condition of the group, and the deck-level conditions (uids shared by all
//! of the deck's records) hold. The final accepted set is the intersection of
//! every group's accepted set, so evaluation order does not matter.
//!
//! Conditions on unresolved or unknown fields never match.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Condition, Uid, Value};

/// Which part of a decklist a card is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mainboard,
    Sideboard,
}

impl Container {
    pub fn as_str(self) -> &'static str {
        match self {
            Container::Mainboard => "mainboard",
            Container::Sideboard => "sideboard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mainboard" => Some(Container::Mainboard),
            "sideboard" => Some(Container::Sideboard),
            _ => None,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One card line of one decklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCardRecord {
    pub deck_uid: Uid,
    pub archetype_uid: Uid,
    pub event_uid: Uid,
    pub cardname: String,
    pub quantity: u32,
    pub container: Container,
}

/// Record fields a condition can target, by canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    CardName,
    Quantity,
    Container,
    DeckUid,
    ArchetypeUid,
    EventUid,
}

/// Borrowed view of a record field.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl RecordField {
    /// Map a canonical parameter name to a field (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cardname" => Some(RecordField::CardName),
            "quantity" => Some(RecordField::Quantity),
            "container" => Some(RecordField::Container),
            "deck_uid" => Some(RecordField::DeckUid),
            "archetype_uid" => Some(RecordField::ArchetypeUid),
            "event_uid" => Some(RecordField::EventUid),
            _ => None,
        }
    }

    /// Fields shared by every record of a deck.
    pub fn is_deck_level(self) -> bool {
        matches!(self, RecordField::DeckUid | RecordField::ArchetypeUid | RecordField::EventUid)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, RecordField::CardName | RecordField::Container)
    }
}

impl DeckCardRecord {
    fn field(&self, field: RecordField) -> FieldValue<'_> {
        match field {
            RecordField::CardName => FieldValue::Text(&self.cardname),
            RecordField::Quantity => FieldValue::Number(f64::from(self.quantity)),
            RecordField::Container => FieldValue::Text(self.container.as_str()),
            RecordField::DeckUid => FieldValue::Number(self.deck_uid as f64),
            RecordField::ArchetypeUid => FieldValue::Number(self.archetype_uid as f64),
            RecordField::EventUid => FieldValue::Number(self.event_uid as f64),
        }
    }
}

/// Whether `record` satisfies `condition` on its own.
pub fn matches(condition: &Condition, record: &DeckCardRecord) -> bool {
    let Some(field) = condition.parameter.canonical().and_then(RecordField::from_name) else {
        return false;
    };
    let op = condition.operator;
    match (record.field(field), &condition.value) {
        (FieldValue::Number(lhs), Value::Number(rhs)) => op.compare(&lhs, rhs),
        (FieldValue::Text(lhs), Value::Text(rhs)) => op.compare(lhs, rhs.as_str()),
        (FieldValue::Text(lhs), number @ Value::Number(_)) => op.compare(lhs, number.to_string().as_str()),
        (FieldValue::Number(_), Value::Text(_)) => false,
    }
}

/// Accepted-deck count of one group, evaluated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub group: u32,
    pub accepted: usize,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOutcome {
    /// Decks accepted by every group.
    pub accepted: BTreeSet<Uid>,
    /// Per-group counts, ascending by group number.
    pub groups: Vec<GroupOutcome>,
}

/// Apply grouped `conditions` to `records`.
///
/// With no conditions every deck is accepted.
pub fn evaluate(conditions: &[Condition], records: &[DeckCardRecord]) -> FilterOutcome {
    let mut decks: BTreeMap<Uid, Vec<&DeckCardRecord>> = BTreeMap::new();
    for record in records {
        decks.entry(record.deck_uid).or_default().push(record);
    }

    let mut by_group: BTreeMap<u32, Vec<&Condition>> = BTreeMap::new();
    for condition in conditions {
        by_group.entry(condition.group).or_default().push(condition);
    }

    let mut accepted: BTreeSet<Uid> = decks.keys().copied().collect();
    let mut groups = Vec::with_capacity(by_group.len());

    for (&group, conditions) in &by_group {
        let passing: BTreeSet<Uid> =
            decks.iter().filter(|(_, cards)| deck_passes(conditions, cards)).map(|(&uid, _)| uid).collect();
        debug!(group, accepted = passing.len(), decks = decks.len(), "evaluated condition group");

        accepted.retain(|uid| passing.contains(uid));
        groups.push(GroupOutcome { group, accepted: passing.len() });
    }

    FilterOutcome { accepted, groups }
}

fn deck_passes(conditions: &[&Condition], cards: &[&DeckCardRecord]) -> bool {
    let (deck_level, record_level): (Vec<&Condition>, Vec<&Condition>) =
        conditions.iter().copied().partition(|c| {
            c.parameter.canonical().and_then(RecordField::from_name).is_some_and(RecordField::is_deck_level)
        });

    let Some(first) = cards.first() else {
        return false;
    };
    if !deck_level.iter().all(|c| matches(c, first)) {
        return false;
    }
    if record_level.is_empty() {
        return true;
    }
    cards.iter().any(|card| record_level.iter().all(|c| matches(c, card)))
}
