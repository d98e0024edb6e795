//! Integration tests: significance scenarios and report invariants.

use proptest::prelude::*;

use vantage_core::constants::reasons;
use vantage_core::models::{ConfidenceLevel, Variant, VariantCounts};
use vantage_core::{ErrorKind, VantageError};
use vantage_evaluator::SignificanceEvaluator;

fn evaluator() -> SignificanceEvaluator {
    SignificanceEvaluator::default()
}

#[test]
fn clear_lift_for_b_at_95() {
    let counts = VariantCounts::new(1000, 100, 1000, 150);
    let report = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();

    assert!((report.a.conversion_rate - 0.10).abs() < 1e-12);
    assert!((report.b.conversion_rate - 0.15).abs() < 1e-12);
    assert!((report.improvement_percent - 50.0).abs() < 1e-9);
    assert!((report.z_score - 3.38).abs() < 0.01);
    assert!(report.p_value < 0.001);
    assert!(report.is_significant);
    assert!(report.recommendation.should_stop);
    assert_eq!(report.recommendation.winner, Some(Variant::B));
    assert_eq!(report.recommendation.reason, reasons::B_OUTPERFORMS_A);
}

#[test]
fn same_data_not_significant_at_stricter_level_when_z_is_moderate() {
    // z ≈ 2.1: significant at 95, not at 99.
    let counts = VariantCounts::new(2000, 200, 2000, 250);
    let at_95 = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();
    let at_99 = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyNine)
        .unwrap();

    assert!(at_95.z_score > 1.96 && at_95.z_score < 2.576, "z = {}", at_95.z_score);
    assert!(at_95.is_significant);
    assert!(!at_99.is_significant);
    assert_eq!(at_99.recommendation.reason, reasons::CONTINUE_TEST);
    assert_eq!(at_95.z_score, at_99.z_score);
}

#[test]
fn small_samples_are_insufficient() {
    let counts = VariantCounts::new(50, 6, 50, 8);
    let report = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();

    assert!(!report.is_significant);
    assert!(!report.recommendation.should_stop);
    assert_eq!(report.recommendation.winner, None);
    assert_eq!(report.recommendation.reason, reasons::INSUFFICIENT_SAMPLE);
}

#[test]
fn empty_arm_reports_zeros() {
    let counts = VariantCounts::new(0, 0, 500, 50);
    let report = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();

    assert_eq!(report.a.conversion_rate, 0.0);
    assert_eq!((report.a.ci_low, report.a.ci_high), (0.0, 0.0));
    assert_eq!(report.z_score, 0.0);
    assert_eq!(report.improvement_percent, 100.0);
    assert!(!report.is_significant);
    assert_eq!(report.recommendation.reason, reasons::INSUFFICIENT_SAMPLE);
}

#[test]
fn identical_rates_continue() {
    let counts = VariantCounts::new(5000, 500, 5000, 500);
    let report = evaluator()
        .evaluate(&counts, ConfidenceLevel::Ninety)
        .unwrap();

    assert_eq!(report.z_score, 0.0);
    assert!((report.p_value - 1.0).abs() < 1e-12);
    assert_eq!(report.improvement_percent, 0.0);
    assert!(!report.recommendation.should_stop);
    assert_eq!(report.recommendation.reason, reasons::CONTINUE_TEST);
}

#[test]
fn configured_floor_is_respected() {
    let counts = VariantCounts::new(40, 2, 40, 20);
    let default = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();
    let lenient = SignificanceEvaluator::new(30)
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();

    assert!(!default.is_significant);
    assert!(lenient.is_significant);
    assert_eq!(lenient.recommendation.winner, Some(Variant::B));
}

#[test]
fn rejects_unknown_confidence_level() {
    let err = evaluator()
        .evaluate_at_percent(&VariantCounts::new(10, 1, 10, 1), 80)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("invalid confidence level"));
}

#[test]
fn rejects_more_conversions_than_visits() {
    let err = evaluator()
        .evaluate(&VariantCounts::new(10, 11, 10, 1), ConfidenceLevel::NinetyFive)
        .unwrap_err();
    assert!(matches!(err, VantageError::InvalidArgument { .. }));
}

#[test]
fn counts_near_u64_max_do_not_overflow() {
    let half = u64::MAX / 2 + 1;
    let counts = VariantCounts::new(u64::MAX, half, u64::MAX, half);
    let report = evaluator()
        .evaluate(&counts, ConfidenceLevel::NinetyFive)
        .unwrap();

    assert!(report.z_score.is_finite());
    assert!((0.0..=1.0).contains(&report.p_value));
    assert!(!report.is_significant);
    assert!(report.a.ci_low >= 0.0 && report.a.ci_high <= 1.0);
    assert!(!report.recommendation.should_stop);
}

#[test]
fn report_serializes_for_the_dashboard() {
    let report = evaluator()
        .evaluate(&VariantCounts::new(1000, 100, 1000, 150), ConfidenceLevel::NinetyFive)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["confidence_level"], 95);
    assert_eq!(json["recommendation"]["winner"], "B");
}

fn counts_strategy() -> impl Strategy<Value = VariantCounts> {
    (0u64..5_000, 0u64..5_000).prop_flat_map(|(va, vb)| {
        (0..=va, 0..=vb).prop_map(move |(ca, cb)| VariantCounts::new(va, ca, vb, cb))
    })
}

fn level_strategy() -> impl Strategy<Value = ConfidenceLevel> {
    prop_oneof![
        Just(ConfidenceLevel::Ninety),
        Just(ConfidenceLevel::NinetyFive),
        Just(ConfidenceLevel::NinetyNine),
    ]
}

proptest! {
    #[test]
    fn prop_evaluation_is_deterministic(counts in counts_strategy(), level in level_strategy()) {
        let first = evaluator().evaluate(&counts, level).unwrap();
        let second = evaluator().evaluate(&counts, level).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_report_is_internally_consistent(counts in counts_strategy(), level in level_strategy()) {
        let report = evaluator().evaluate(&counts, level).unwrap();

        prop_assert!((0.0..=1.0).contains(&report.p_value));
        prop_assert!(report.z_score.is_finite());
        for arm in [report.a, report.b] {
            prop_assert!(0.0 <= arm.ci_low && arm.ci_low <= arm.conversion_rate);
            prop_assert!(arm.conversion_rate <= arm.ci_high && arm.ci_high <= 1.0);
        }
        // Stopping always names a winner, and only when significant.
        prop_assert_eq!(report.recommendation.should_stop, report.recommendation.winner.is_some());
        if report.recommendation.should_stop {
            prop_assert!(report.is_significant);
        }
        if counts.a.visits < 100 || counts.b.visits < 100 {
            prop_assert!(!report.is_significant);
            prop_assert_eq!(report.recommendation.reason.as_str(), reasons::INSUFFICIENT_SAMPLE);
        }
    }
}
