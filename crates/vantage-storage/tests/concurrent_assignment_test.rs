//! Integration test: many threads assigning overlapping visitors.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use vantage_core::models::*;
use vantage_core::traits::IExperimentStorage;
use vantage_core::ErrorKind;
use vantage_storage::StorageEngine;

fn active_experiment(engine: &StorageEngine) {
    let exp = Experiment::from_new(
        "exp-1".into(),
        NewExperiment::new("Concurrent", UrlTarget::exact("/")),
        ConfidenceLevel::NinetyFive,
    );
    engine
        .create_experiment(&exp, &ExperimentEvent::new("exp-1", EventKind::Created))
        .unwrap();
    engine
        .apply_transition(&StatusTransition {
            experiment_id: "exp-1".into(),
            from: ExperimentStatus::Draft,
            to: ExperimentStatus::Active,
            winner: None,
            at: Utc::now(),
            event: ExperimentEvent::new("exp-1", EventKind::Started),
        })
        .unwrap();
}

/// Lookup-or-create the way the allocator does it.
fn assign(engine: &StorageEngine, visitor: &str, variant: Variant) -> Variant {
    if let Some(existing) = engine.get_assignment("exp-1", visitor).unwrap() {
        return existing.variant;
    }
    match engine.insert_assignment(&Assignment::new("exp-1", visitor, variant)) {
        Ok(()) => variant,
        Err(e) if e.kind() == ErrorKind::ConflictRetryable => {
            engine
                .get_assignment("exp-1", visitor)
                .unwrap()
                .unwrap()
                .variant
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[test]
fn visits_equal_distinct_visitors_under_contention() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(StorageEngine::open(&dir.path().join("concurrent.db")).unwrap());
    active_experiment(&engine);

    let mut handles = vec![];
    for t in 0..8u32 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            // Every thread walks the same 50 visitors, plus 25 of its own.
            let mut seen = vec![];
            for i in 0..50 {
                let variant = if (i + t) % 2 == 0 { Variant::A } else { Variant::B };
                seen.push((format!("shared-{i}"), assign(&engine, &format!("shared-{i}"), variant)));
            }
            for i in 0..25 {
                assign(&engine, &format!("own-{t}-{i}"), Variant::A);
            }
            seen
        }));
    }

    let mut per_visitor: std::collections::HashMap<String, HashSet<Variant>> = Default::default();
    for handle in handles {
        for (visitor, variant) in handle.join().expect("worker should not panic") {
            per_visitor.entry(visitor).or_default().insert(variant);
        }
    }

    // Every thread saw the same variant for each shared visitor.
    assert!(per_visitor.values().all(|variants| variants.len() == 1));

    let counts = engine.counts("exp-1").unwrap().unwrap();
    let distinct = 50 + 8 * 25;
    assert_eq!(counts.total_visits(), distinct);
    assert_eq!(engine.assignment_count("exp-1").unwrap(), distinct);
}
