use crate::error::EstimateError;
use crate::swiss::{Record, RecordBin, estimate, triangle};

fn bins(pairs: &[(&str, u64)]) -> Vec<RecordBin> {
    pairs.iter().map(|(record, count)| RecordBin::new(*record, *count)).collect()
}

fn full_histogram(players: u64, rounds: u32) -> Vec<RecordBin> {
    triangle(players, rounds).into_iter().map(|(record, count)| RecordBin::new(record.to_string(), count)).collect()
}

#[test]
fn sixteen_player_three_round_event() {
    let est = estimate(&bins(&[("3-0", 2), ("2-1", 6), ("1-2", 6), ("0-3", 2)])).unwrap();
    assert_eq!(est.estimated_players, 16);
    assert!(est.exact);
    assert_eq!(est.rounds, 3);
    assert_eq!(est.observed_total, 16);
    assert_eq!(est.deviation, 0);
    assert_eq!(est.theoretical_distribution, est.observed_distribution);
}

#[test]
fn bin_order_does_not_matter() {
    let shuffled = estimate(&bins(&[("1-2", 6), ("3-0", 2), ("0-3", 2), ("2-1", 6)])).unwrap();
    assert_eq!(shuffled.estimated_players, 16);
    assert!(shuffled.exact);
}

#[test]
fn full_power_of_two_field_is_recovered() {
    let est = estimate(&full_histogram(32, 5)).unwrap();
    assert_eq!(est.estimated_players, 32);
    assert!(est.exact);
}

#[test]
fn truncated_feed_recovers_the_whole_field() {
    // Only players at 4-1 or better published, out of 128 over 5 rounds.
    let est = estimate(&bins(&[("5-0", 4), ("4-1", 20)])).unwrap();
    assert_eq!(est.observed_total, 24);
    assert_eq!(est.estimated_players, 128);
    assert!(est.exact);
    assert_eq!(est.theoretical_distribution.values().sum::<u64>(), 128);
}

#[test]
fn small_event_with_only_a_deep_bucket_is_exact() {
    let est = estimate(&bins(&[("0-3", 5)])).unwrap();
    assert!(est.exact);
    assert_eq!(est.estimated_players, 40);
    assert_eq!(est.observed_total, 5);
}

#[test]
fn small_event_rule_stops_at_thirty_two_players() {
    let below = estimate(&bins(&[("3-0", 1), ("0-3", 30)])).unwrap();
    assert!(below.exact);
    assert_eq!(below.estimated_players, 240);

    // At 32 observed both candidates deviate by 30; the first one is kept.
    let at = estimate(&bins(&[("3-0", 1), ("0-3", 31)])).unwrap();
    assert!(!at.exact);
    assert_eq!(at.estimated_players, 8);
    assert_eq!(at.deviation, 30);
}

#[test]
fn worst_bucket_alone_below_thirty_two_is_exact() {
    let est = estimate(&bins(&[("0-3", 31)])).unwrap();
    assert!(est.exact);
    assert_eq!(est.estimated_players, 248);
}

#[test]
fn thirty_two_observed_falls_through_to_the_interior_search() {
    let below = estimate(&bins(&[("3-0", 1), ("1-2", 1), ("0-3", 29)])).unwrap();
    assert!(below.exact);
    assert_eq!(below.estimated_players, 232);

    let at = estimate(&bins(&[("3-0", 1), ("1-2", 1), ("0-3", 30)])).unwrap();
    assert!(at.exact);
    assert_eq!(at.estimated_players, 3);
    assert_eq!(at.deviation, 30);
}

#[test]
fn small_event_rule_ignores_the_other_buckets() {
    let est = estimate(&bins(&[("3-0", 5), ("2-1", 1), ("0-3", 2)])).unwrap();
    assert!(est.exact);
    assert_eq!(est.estimated_players, 16);
    assert_eq!(est.deviation, 8);
}

#[test]
fn interior_search_reconciles_rounding_at_the_extremes() {
    // 64 players over 6 rounds; candidates back-solve to 65, whose 6-0 bucket
    // is off by one, so the interior buckets decide.
    let est = estimate(&full_histogram(64, 6)).unwrap();
    assert!(est.exact);
    assert_eq!(est.estimated_players, 65);
    assert_eq!(est.deviation, 1);
}

#[test]
fn irreconcilable_histogram_is_approximate() {
    let est = estimate(&bins(&[("3-0", 10), ("2-1", 1), ("1-2", 30), ("0-3", 1)])).unwrap();
    assert!(!est.exact);
    assert_eq!(est.estimated_players, 80);
    assert_eq!(est.deviation, 38);
    assert_eq!(est.observed_total, 42);
}

#[test]
fn duplicate_records_are_merged() {
    let est = estimate(&bins(&[("3-0", 1), ("3-0", 1), ("2-1", 6), ("1-2", 6), ("0-3", 2)])).unwrap();
    assert_eq!(est.observed_distribution[&Record::new(3, 0)], 2);
    assert_eq!(est.estimated_players, 16);
}

#[test]
fn malformed_bin_is_an_error() {
    let err = estimate(&bins(&[("3-0", 2), ("two-one", 6)])).unwrap_err();
    assert_eq!(err, EstimateError::MalformedRecordBin("two-one".to_string()));
}

#[test]
fn mixed_round_counts_are_an_error() {
    let err = estimate(&bins(&[("3-0", 2), ("2-0", 6)])).unwrap_err();
    assert_eq!(err, EstimateError::InconsistentRounds { record: "2-0".to_string(), expected: 3, found: 2 });
}

#[test]
fn oversized_rounds_are_an_error() {
    let err = estimate(&bins(&[("4294967295-1", 1)])).unwrap_err();
    assert!(matches!(err, EstimateError::TooManyRounds { max: 20, .. }));
    assert!(matches!(estimate(&bins(&[("100000-0", 1)])), Err(EstimateError::TooManyRounds { .. })));
}

#[test]
fn huge_counts_do_not_overflow() {
    let est = estimate(&bins(&[("1-0", 1), ("0-1", u64::MAX / 1000)])).unwrap();
    assert!(!est.exact);
    assert_eq!(est.estimated_players, 2);

    let err = estimate(&bins(&[("0-1", u64::MAX)])).unwrap_err();
    assert_eq!(err, EstimateError::CountOverflow("0-1".to_string()));

    let err = estimate(&bins(&[("1-0", u64::MAX), ("1-0", 1)])).unwrap_err();
    assert_eq!(err, EstimateError::CountOverflow("1-0".to_string()));

    let err = estimate(&bins(&[("1-0", u64::MAX), ("0-1", 1)])).unwrap_err();
    assert_eq!(err, EstimateError::CountOverflow("1-0".to_string()));
}

#[test]
fn empty_histogram_is_an_error() {
    assert_eq!(estimate(&[]).unwrap_err(), EstimateError::EmptyHistogram);
}

#[test]
fn zero_count_buckets_fall_back_to_observed_total() {
    let est = estimate(&bins(&[("3-0", 0), ("2-1", 0)])).unwrap();
    assert!(!est.exact);
    assert_eq!(est.estimated_players, 0);
}

#[test]
fn estimate_serializes_records_as_labels() {
    let est = estimate(&bins(&[("1-0", 1), ("0-1", 1)])).unwrap();
    let json = serde_json::to_value(&est).unwrap();
    assert_eq!(json["theoretical_distribution"]["1-0"], 1);
    assert_eq!(json["observed_distribution"]["0-1"], 1);
    assert_eq!(json["exact"], true);
}
