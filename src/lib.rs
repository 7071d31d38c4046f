extern crate self as decklens;

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[macro_use]
mod macros;
mod api;
pub mod config;
mod error;
pub mod events;
pub mod metagame;
pub mod query;
pub mod swiss;

pub use api::{
    Context, QueryDetails, QueryOutcome, estimate_event, filter_decks, parse_query, parse_query_verbose, run_query,
    select_events,
};
pub use config::{AliasConfig, AliasSet};
pub use error::{ConfigError, EstimateError};
pub use query::{
    CardResolver, DeckCardRecord, FilterOutcome, GroupOutcome, IgnoredGroup, Invalidity, RecordField, Tokenizer,
    Validation,
};
pub use swiss::{Record, RecordBin, SwissEstimate};

/// Opaque identifier of a deck, archetype or event.
pub type Uid = u64;

// --- Comparison primitives ---------------------------------------------------

/// One of the six comparison symbols a query may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::Greater,
        Operator::Less,
        Operator::Equal,
        Operator::NotEqual,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
        }
    }

    /// Compare `lhs` (the record side) against `rhs` (the query side).
    ///
    /// Incomparable operands (`NaN`) never satisfy any operator.
    pub fn compare<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        let Some(ordering) = lhs.partial_cmp(rhs) else {
            return false;
        };
        match self {
            Operator::GreaterOrEqual => ordering.is_ge(),
            Operator::LessOrEqual => ordering.is_le(),
            Operator::Greater => ordering.is_gt(),
            Operator::Less => ordering.is_lt(),
            Operator::Equal => ordering.is_eq(),
            Operator::NotEqual => ordering.is_ne(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL.into_iter().find(|op| op.symbol() == s).ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

/// A condition value: a number when the raw text parses fully as one,
/// otherwise the text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerce raw query text into a value.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && !trimmed.is_empty() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // whole numbers print without a decimal point
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A single `key<op>value` comparison lifted out of free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonToken {
    pub raw_parameter: String,
    pub operator: Operator,
    pub raw_value: String,
}

impl fmt::Display for ComparisonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.raw_parameter, self.operator, self.raw_value)
    }
}

/// Field a condition targets after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Canonical name of the matched alias set.
    Canonical(String),
    /// No alias set claimed the raw name.
    Unresolved,
}

impl Parameter {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Parameter::Canonical(name) => Some(name),
            Parameter::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Parameter::Canonical(_))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical().unwrap_or("unresolved"))
    }
}

impl Serialize for Parameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A grouped filter predicate. Conditions sharing a `group` are AND-ed
/// against the same record; groups are AND-ed against the deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub group: u32,
    pub parameter: Parameter,
    /// Name as typed, kept for echoing unresolved conditions.
    pub raw_parameter: String,
    pub operator: Operator,
    pub value: Value,
}

impl fmt::Display for Condition {
    /// Renders `parameter operator value`, quoting text values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.parameter {
            Parameter::Canonical(name) => name.as_str(),
            Parameter::Unresolved => self.raw_parameter.as_str(),
        };
        match &self.value {
            Value::Number(_) => write!(f, "{} {} {}", name.to_lowercase(), self.operator, self.value),
            Value::Text(s) => write!(f, "{} {} '{}'", name.to_lowercase(), self.operator, s),
        }
    }
}
