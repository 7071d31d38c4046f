//! Free-text filter queries.
//!
//! A query string becomes a set of grouped conditions, which are then checked
//! against decklist records:
//!
//! ```text
//! "card Bolt qty>=4 card Fireblast"
//!        │
//!        │  Tokenizer::tokenize                 (tokenizer.rs)
//!        v
//! [card=Bolt] [qty>=4] [card=Fireblast]
//!        │
//!        │  group + AliasConfig                 (grouper.rs)
//!        v
//! 1: cardname = 'Bolt', quantity >= 4
//! 2: cardname = 'Fireblast'
//!        │
//!        │  validate (+ CardResolver)           (validate.rs, optional)
//!        v
//! usable conditions / ignored groups
//!        │
//!        │  evaluate + DeckCardRecord           (evaluate.rs)
//!        v
//! accepted deck uids
//! ```
//!
//! Conditions inside a group must hold against the *same* card record; groups
//! are AND-ed at deck level. `echo.rs` renders conditions back to text.
//!
//! Nothing here fails on malformed input: fragments without a comparison are
//! dropped, unknown names become [`Parameter::Unresolved`](crate::Parameter)
//! and never match.

#[path = "query/echo.rs"]
mod echo;
#[path = "query/evaluate.rs"]
mod evaluate;
#[path = "query/grouper.rs"]
mod grouper;
#[path = "query/tokenizer.rs"]
mod tokenizer;
#[path = "query/validate.rs"]
mod validate;

#[cfg(test)]
#[path = "query/tests.rs"]
mod tests;

pub use echo::{describe_group, describe_groups};
pub use evaluate::{Container, DeckCardRecord, FilterOutcome, GroupOutcome, RecordField, evaluate, matches};
pub use grouper::{group, group_numbers};
pub use tokenizer::{Tokenizer, tokenize};
pub use validate::{CardResolver, IgnoredGroup, Invalidity, Validation, validate};

