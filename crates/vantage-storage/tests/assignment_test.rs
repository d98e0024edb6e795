//! Integration tests: assignment uniqueness, visit and conversion counters.

use chrono::Utc;

use vantage_core::models::*;
use vantage_core::traits::{ConversionWrite, IExperimentStorage};
use vantage_core::{ErrorKind, VantageError};
use vantage_storage::StorageEngine;

fn engine_with(status: ExperimentStatus) -> StorageEngine {
    let engine = StorageEngine::open_in_memory().unwrap();
    let exp = Experiment::from_new(
        "exp-1".into(),
        NewExperiment::new("CTA colour", UrlTarget::wildcard("/quote/*")),
        ConfidenceLevel::NinetyFive,
    );
    engine
        .create_experiment(&exp, &ExperimentEvent::new("exp-1", EventKind::Created))
        .unwrap();

    let path: &[ExperimentStatus] = match status {
        ExperimentStatus::Draft => &[],
        ExperimentStatus::Active => &[ExperimentStatus::Active],
        ExperimentStatus::Paused => &[ExperimentStatus::Active, ExperimentStatus::Paused],
        ExperimentStatus::Completed => &[ExperimentStatus::Active, ExperimentStatus::Completed],
    };
    let mut from = ExperimentStatus::Draft;
    for &to in path {
        assert!(engine
            .apply_transition(&StatusTransition {
                experiment_id: "exp-1".into(),
                from,
                to,
                winner: None,
                at: Utc::now(),
                event: ExperimentEvent::new("exp-1", EventKind::Started).with_statuses(from, to),
            })
            .unwrap());
        from = to;
    }
    engine
}

fn counts(engine: &StorageEngine) -> VariantCounts {
    engine.counts("exp-1").unwrap().unwrap()
}

#[test]
fn insert_counts_one_visit_for_the_assigned_variant() {
    let engine = engine_with(ExperimentStatus::Active);
    engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::B))
        .unwrap();

    assert_eq!(counts(&engine), VariantCounts::new(0, 0, 1, 0));
    assert_eq!(engine.assignment_count("exp-1").unwrap(), 1);
    let stored = engine.get_assignment("exp-1", "visitor-1").unwrap().unwrap();
    assert_eq!(stored.variant, Variant::B);
    assert!(!stored.converted);
}

#[test]
fn duplicate_visitor_is_conflict_and_not_counted() {
    let engine = engine_with(ExperimentStatus::Active);
    engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::A))
        .unwrap();

    let err = engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::B))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConflictRetryable);

    assert_eq!(counts(&engine), VariantCounts::new(1, 0, 0, 0));
    assert_eq!(
        engine
            .get_assignment("exp-1", "visitor-1")
            .unwrap()
            .unwrap()
            .variant,
        Variant::A
    );
}

#[test]
fn insert_into_paused_experiment_rolls_back() {
    let engine = engine_with(ExperimentStatus::Paused);
    let err = engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::A))
        .unwrap_err();

    assert!(matches!(
        err,
        VantageError::InvalidState {
            status: ExperimentStatus::Paused,
            ..
        }
    ));
    // No assignment without a counted visit.
    assert!(engine.get_assignment("exp-1", "visitor-1").unwrap().is_none());
    assert_eq!(counts(&engine), VariantCounts::default());
}

#[test]
fn insert_for_unknown_experiment_is_not_found() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let err = engine
        .insert_assignment(&Assignment::new("ghost", "visitor-1", Variant::A))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn conversion_counts_once() {
    let engine = engine_with(ExperimentStatus::Active);
    engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::B))
        .unwrap();

    assert_eq!(
        engine.mark_converted("exp-1", "visitor-1", Utc::now()).unwrap(),
        ConversionWrite::Recorded(Variant::B)
    );
    assert_eq!(
        engine.mark_converted("exp-1", "visitor-1", Utc::now()).unwrap(),
        ConversionWrite::AlreadyConverted(Variant::B)
    );

    assert_eq!(counts(&engine), VariantCounts::new(0, 0, 1, 1));
    let stored = engine.get_assignment("exp-1", "visitor-1").unwrap().unwrap();
    assert!(stored.converted);
    assert!(stored.converted_at.is_some());
}

#[test]
fn conversion_without_assignment_changes_nothing() {
    let engine = engine_with(ExperimentStatus::Active);
    assert_eq!(
        engine.mark_converted("exp-1", "stranger", Utc::now()).unwrap(),
        ConversionWrite::NoAssignment
    );
    assert_eq!(counts(&engine), VariantCounts::default());
}

#[test]
fn paused_experiment_still_counts_conversions() {
    let engine = engine_with(ExperimentStatus::Active);
    engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::A))
        .unwrap();
    engine
        .apply_transition(&StatusTransition {
            experiment_id: "exp-1".into(),
            from: ExperimentStatus::Active,
            to: ExperimentStatus::Paused,
            winner: None,
            at: Utc::now(),
            event: ExperimentEvent::new("exp-1", EventKind::Paused),
        })
        .unwrap();

    assert_eq!(
        engine.mark_converted("exp-1", "visitor-1", Utc::now()).unwrap(),
        ConversionWrite::Recorded(Variant::A)
    );
    assert_eq!(counts(&engine), VariantCounts::new(1, 1, 0, 0));
}

#[test]
fn completed_experiment_freezes_conversions() {
    let engine = engine_with(ExperimentStatus::Active);
    engine
        .insert_assignment(&Assignment::new("exp-1", "visitor-1", Variant::A))
        .unwrap();
    engine
        .apply_transition(&StatusTransition {
            experiment_id: "exp-1".into(),
            from: ExperimentStatus::Active,
            to: ExperimentStatus::Completed,
            winner: None,
            at: Utc::now(),
            event: ExperimentEvent::new("exp-1", EventKind::Stopped),
        })
        .unwrap();

    let err = engine
        .mark_converted("exp-1", "visitor-1", Utc::now())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Flag flip was rolled back with the refused increment.
    assert!(!engine
        .get_assignment("exp-1", "visitor-1")
        .unwrap()
        .unwrap()
        .converted);
    assert_eq!(counts(&engine), VariantCounts::new(1, 0, 0, 0));
}
