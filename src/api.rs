use crate::error::EstimateError;
use crate::events::{EventSummary, EventWindow};
use crate::metagame::{Catalog, catalog};
use crate::query::{self, CardResolver, DeckCardRecord, FilterOutcome, IgnoredGroup, Tokenizer};
use crate::swiss::{self, RecordBin, SwissEstimate};
use crate::{AliasConfig, ComparisonToken, Condition};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Environment for operations that depend on the current date.
#[derive(Debug, Clone)]
pub struct Context {
    /// Day event windows are measured back from.
    pub today: NaiveDate,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            Self { today: NaiveDate::from_ymd_opt(2022, 3, 14).unwrap_or_default() }
        } else {
            Self { today: Local::now().date_naive() }
        }
    }
}

/// Additional details returned by [`parse_query_verbose`].
#[derive(Debug, Clone)]
pub struct QueryDetails {
    /// The parsed query text.
    pub text: String,
    /// Comparison tokens in input order.
    pub tokens: Vec<ComparisonToken>,
    /// Fragments that carried no usable comparison.
    pub dropped: Vec<String>,
    pub conditions: Vec<Condition>,
    /// Time spent tokenizing.
    pub tokenize: Duration,
    /// Time spent resolving aliases and assigning groups.
    pub group: Duration,
    pub total: Duration,
}

/// Result of [`run_query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// Conditions that took part in filtering.
    pub conditions: Vec<Condition>,
    /// Groups left out because a condition could never match.
    pub ignored: Vec<IgnoredGroup>,
    pub filter: FilterOutcome,
    pub catalog: Catalog,
}

/// Parse `text` into grouped conditions using the aliases of `config`.
///
/// # Example
/// ```
/// use decklens::{AliasConfig, parse_query};
///
/// let conditions = parse_query("card Bolt qty>=4", &AliasConfig::cards());
/// assert_eq!(conditions.len(), 2);
/// assert!(conditions.iter().all(|c| c.group == 1));
/// ```
pub fn parse_query(text: &str, config: &AliasConfig) -> Vec<Condition> {
    let tokens = Tokenizer::for_config(config).tokenize(text);
    query::group(&tokens, config)
}

/// [`parse_query`] with tokens, dropped fragments and per-stage timings.
pub fn parse_query_verbose(text: &str, config: &AliasConfig) -> QueryDetails {
    let start = Instant::now();
    let scan = Tokenizer::for_config(config).scan(text);
    let tokenize = start.elapsed();

    let grouping = Instant::now();
    let conditions = query::group(&scan.tokens, config);
    let group = grouping.elapsed();

    QueryDetails {
        text: text.to_string(),
        tokens: scan.tokens,
        dropped: scan.dropped,
        conditions,
        tokenize,
        group,
        total: start.elapsed(),
    }
}

/// Apply `conditions` to `records`. See [`query::evaluate`].
pub fn filter_decks(conditions: &[Condition], records: &[DeckCardRecord]) -> FilterOutcome {
    query::evaluate(conditions, records)
}

/// Estimate attendance from a published record histogram.
pub fn estimate_event(bins: &[RecordBin]) -> Result<SwissEstimate, EstimateError> {
    swiss::estimate(bins)
}

/// Events of `window` relative to `context`, newest first.
pub fn select_events<'a>(window: &EventWindow, events: &'a [EventSummary], context: &Context) -> Vec<&'a EventSummary> {
    window.select(events, context.today)
}

/// Parse, validate and evaluate `text` against `records`, then aggregate the
/// accepted decks.
///
/// Groups that fail validation are reported in [`QueryOutcome::ignored`] and
/// do not restrict the result. When every group fails, nothing is accepted.
pub fn run_query(
    text: &str,
    config: &AliasConfig,
    records: &[DeckCardRecord],
    resolver: Option<&dyn CardResolver>,
) -> QueryOutcome {
    let validation = query::validate(parse_query(text, config), resolver);
    let filter = if validation.conditions.is_empty() && !validation.ignored.is_empty() {
        debug!(ignored = validation.ignored.len(), "every condition group is invalid");
        FilterOutcome::default()
    } else {
        query::evaluate(&validation.conditions, records)
    };
    debug!(
        conditions = validation.conditions.len(),
        ignored = validation.ignored.len(),
        accepted = filter.accepted.len(),
        "ran query"
    );

    QueryOutcome {
        catalog: catalog(records, &filter.accepted),
        conditions: validation.conditions,
        ignored: validation.ignored,
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Container;
    use crate::{Invalidity, Operator, Value};

    fn record(deck: u64, archetype: u64, name: &str, quantity: u32) -> DeckCardRecord {
        DeckCardRecord {
            deck_uid: deck,
            archetype_uid: archetype,
            event_uid: 1,
            cardname: name.into(),
            quantity,
            container: Container::Mainboard,
        }
    }

    fn records() -> Vec<DeckCardRecord> {
        vec![
            record(1, 10, "Lightning Bolt", 4),
            record(1, 10, "Fireblast", 2),
            record(2, 10, "Lightning Bolt", 2),
            record(3, 20, "Counterspell", 4),
        ]
    }

    #[test]
    fn default_context_is_fixed_under_test() {
        assert_eq!(Context::default().today, NaiveDate::from_ymd_opt(2022, 3, 14).unwrap());
    }

    #[test]
    fn parse_query_verbose_reports_stages() {
        let details = parse_query_verbose("junk card Bolt qty>=4", &AliasConfig::cards());
        assert_eq!(details.text, "junk card Bolt qty>=4");
        assert_eq!(details.tokens.len(), 2);
        assert_eq!(details.dropped, vec!["junk".to_string()]);
        assert_eq!(details.conditions.len(), 2);
        assert_eq!(details.conditions[1].operator, Operator::GreaterOrEqual);
        assert_eq!(details.conditions[1].value, Value::Number(4.0));
        assert!(details.tokenize <= details.total);
        assert!(details.group <= details.total);
    }

    #[test]
    fn run_query_filters_and_aggregates() {
        let outcome = run_query("card Lightning Bolt qty>=4", &AliasConfig::cards(), &records(), None);
        assert_eq!(outcome.filter.accepted.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(outcome.catalog.count, 1);
        assert_eq!(outcome.catalog.archetypes[0].archetype_uid, 10);
        assert_eq!(outcome.catalog.archetypes[0].percentage, 50.0);
        assert!(outcome.ignored.is_empty());
    }

    #[test]
    fn run_query_sets_aside_invalid_groups() {
        let outcome = run_query("card Counterspell card Fireblast qty>=many", &AliasConfig::cards(), &records(), None);
        assert_eq!(outcome.ignored.len(), 1);
        assert_eq!(outcome.ignored[0].group, 2);
        assert_eq!(outcome.ignored[0].reasons, Invalidity::NOT_A_NUMBER);
        assert_eq!(outcome.filter.accepted.iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn run_query_accepts_nothing_when_every_group_is_invalid() {
        let outcome = run_query("price<5", &AliasConfig::cards(), &records(), None);
        assert_eq!(outcome.ignored.len(), 1);
        assert_eq!(outcome.ignored[0].reasons, Invalidity::UNRESOLVED_PARAMETER);
        assert!(outcome.filter.accepted.is_empty());
        assert_eq!(outcome.catalog.count, 0);

        let unknown = |_: &str| -> Option<String> { None };
        let outcome = run_query("card Notacard", &AliasConfig::cards(), &records(), Some(&unknown));
        assert_eq!(outcome.ignored[0].reasons, Invalidity::UNKNOWN_CARD);
        assert!(outcome.conditions.is_empty());
        assert!(outcome.filter.accepted.is_empty());
    }

    #[test]
    fn run_query_without_conditions_accepts_every_deck() {
        let outcome = run_query("nothing to filter", &AliasConfig::cards(), &records(), None);
        assert!(outcome.ignored.is_empty());
        assert_eq!(outcome.filter.accepted.len(), 3);
    }

    #[test]
    fn run_query_canonicalizes_card_names() {
        let resolver = |name: &str| (name.eq_ignore_ascii_case("bolt")).then(|| "Lightning Bolt".to_string());
        let outcome = run_query("card bolt", &AliasConfig::cards(), &records(), Some(&resolver));
        assert_eq!(outcome.conditions[0].value, Value::Text("Lightning Bolt".into()));
        assert_eq!(outcome.filter.accepted.len(), 2);
    }

    #[test]
    fn estimate_event_delegates() {
        let bins = [RecordBin::new("3-0", 2), RecordBin::new("2-1", 6), RecordBin::new("1-2", 6), RecordBin::new("0-3", 2)];
        assert_eq!(estimate_event(&bins).unwrap().estimated_players, 16);
    }

    #[test]
    fn select_events_uses_context_date() {
        let context = Context::default();
        let events = [EventSummary { uid: 1, format: "Modern".into(), kind: "Challenge".into(), date: context.today }];
        assert_eq!(select_events(&EventWindow::default(), &events, &context).len(), 1);
    }
}
