//! Planning of lifecycle transitions.
//!
//! Draft → Active ⇄ Paused → Completed. A plan is only a proposal: the
//! store applies it as a compare-and-set on the status it was planned from.

use chrono::Utc;
use serde_json::json;

use vantage_core::errors::VantageResult;
use vantage_core::models::{
    EventKind, Experiment, ExperimentEvent, LifecycleOp, StatusTransition, Variant,
    WinnerSelection,
};

/// Build the transition for `op` on `experiment`, or `InvalidState`.
///
/// `winner` is only consulted for `Stop`; `selection` is recorded in the
/// audit event so evaluated and manual winners can be told apart.
pub fn plan_transition(
    experiment: &Experiment,
    op: LifecycleOp,
    winner: Option<Variant>,
    selection: WinnerSelection,
    actor: &str,
) -> VantageResult<StatusTransition> {
    let to = experiment.next_status(op)?;
    let winner = if op == LifecycleOp::Stop { winner } else { None };

    let mut event = ExperimentEvent::new(&experiment.id, EventKind::from(op))
        .with_statuses(experiment.status, to)
        .with_winner(winner)
        .with_actor(actor);
    if op == LifecycleOp::Stop {
        event = event.with_details(json!({
            "selection": selection.as_str(),
            "visits_a": experiment.counts.a.visits,
            "conversions_a": experiment.counts.a.conversions,
            "visits_b": experiment.counts.b.visits,
            "conversions_b": experiment.counts.b.conversions,
        }));
    }

    Ok(StatusTransition {
        experiment_id: experiment.id.clone(),
        from: experiment.status,
        to,
        winner,
        at: Utc::now(),
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::constants::SYSTEM_ACTOR;
    use vantage_core::models::{ConfidenceLevel, ExperimentStatus, NewExperiment, UrlTarget};
    use vantage_core::ErrorKind;

    fn experiment(status: ExperimentStatus) -> Experiment {
        let mut exp = Experiment::from_new(
            "exp-1".into(),
            NewExperiment::new("Plan", UrlTarget::exact("/")),
            ConfidenceLevel::NinetyFive,
        );
        exp.status = status;
        exp
    }

    #[test]
    fn start_from_draft() {
        let t = plan_transition(
            &experiment(ExperimentStatus::Draft),
            LifecycleOp::Start,
            Some(Variant::B),
            WinnerSelection::None,
            SYSTEM_ACTOR,
        )
        .unwrap();
        assert_eq!(t.from, ExperimentStatus::Draft);
        assert_eq!(t.to, ExperimentStatus::Active);
        // Winners only travel with stop.
        assert_eq!(t.winner, None);
        assert_eq!(t.event.kind, EventKind::Started);
    }

    #[test]
    fn stop_records_selection() {
        let t = plan_transition(
            &experiment(ExperimentStatus::Paused),
            LifecycleOp::Stop,
            Some(Variant::A),
            WinnerSelection::Manual(Variant::A),
            "alice",
        )
        .unwrap();
        assert_eq!(t.to, ExperimentStatus::Completed);
        assert_eq!(t.winner, Some(Variant::A));
        assert_eq!(t.event.details["selection"], "manual");
        assert_eq!(t.event.actor, "alice");
    }

    #[test]
    fn completed_refuses_everything() {
        for op in [
            LifecycleOp::Start,
            LifecycleOp::Pause,
            LifecycleOp::Resume,
            LifecycleOp::Stop,
        ] {
            let err = plan_transition(
                &experiment(ExperimentStatus::Completed),
                op,
                None,
                WinnerSelection::None,
                SYSTEM_ACTOR,
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
    }
}
