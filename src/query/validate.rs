//! Condition validation.
//!
//! Grouping never rejects anything; this pass decides which groups can be
//! meaningfully evaluated. A group with any invalid condition is set aside as
//! an [`IgnoredGroup`] with the reasons it was ignored. Remaining conditions
//! keep their original group numbers.
//!
//! Card names usually need resolving against a card database (fuzzy lookup).
//! That lookup is the caller's: pass a [`CardResolver`], which may also
//! rewrite the value to the canonical card name.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::evaluate::{Container, RecordField};
use crate::{Condition, Value};

bitflags::bitflags! {
    /// Why a condition group was ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Invalidity: u8 {
        /// No alias set matched the parameter name.
        const UNRESOLVED_PARAMETER = 1 << 0;
        /// The canonical name is not a record field.
        const UNKNOWN_FIELD        = 1 << 1;
        /// A numeric field was given text.
        const NOT_A_NUMBER         = 1 << 2;
        /// Container other than mainboard/sideboard.
        const UNKNOWN_CONTAINER    = 1 << 3;
        /// The card resolver did not recognize the name.
        const UNKNOWN_CARD         = 1 << 4;
    }
}

impl Serialize for Invalidity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_names().map(|(name, _)| name.to_ascii_lowercase()))
    }
}

/// Resolves user-typed card names to canonical names.
pub trait CardResolver {
    /// `None` when the name is not a known card.
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> CardResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// A group set aside by [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoredGroup {
    pub group: u32,
    pub reasons: Invalidity,
    pub conditions: Vec<Condition>,
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Validation {
    /// Conditions of the groups that passed, in input order.
    pub conditions: Vec<Condition>,
    pub ignored: Vec<IgnoredGroup>,
}

impl Validation {
    pub fn is_ignored(&self, group: u32) -> bool {
        self.ignored.iter().any(|g| g.group == group)
    }
}

/// Check every condition and split `conditions` into usable and ignored groups.
pub fn validate(conditions: Vec<Condition>, resolver: Option<&dyn CardResolver>) -> Validation {
    let mut by_group: BTreeMap<u32, (Invalidity, Vec<Condition>)> = BTreeMap::new();

    for mut condition in conditions {
        let reasons = check(&mut condition, resolver);
        let entry = by_group.entry(condition.group).or_default();
        entry.0 |= reasons;
        entry.1.push(condition);
    }

    let mut validation = Validation::default();
    for (group, (reasons, conditions)) in by_group {
        if reasons.is_empty() {
            validation.conditions.extend(conditions);
        } else {
            debug!(group, ?reasons, "ignoring condition group");
            validation.ignored.push(IgnoredGroup { group, reasons, conditions });
        }
    }
    validation
}

fn check(condition: &mut Condition, resolver: Option<&dyn CardResolver>) -> Invalidity {
    let Some(name) = condition.parameter.canonical() else {
        return Invalidity::UNRESOLVED_PARAMETER;
    };
    let Some(field) = RecordField::from_name(name) else {
        return Invalidity::UNKNOWN_FIELD;
    };

    match (field, &condition.value) {
        (RecordField::Container, Value::Text(text)) if Container::from_name(text).is_some() => {}
        (RecordField::Container, _) => return Invalidity::UNKNOWN_CONTAINER,
        (field, Value::Text(_)) if field.is_numeric() => return Invalidity::NOT_A_NUMBER,
        _ => {}
    }

    if let (RecordField::CardName, Some(resolver)) = (field, resolver) {
        let typed = condition.value.to_string();
        match resolver.resolve(&typed) {
            Some(canonical) => condition.value = Value::Text(canonical),
            None => return Invalidity::UNKNOWN_CARD,
        }
    }
    Invalidity::empty()
}
