//! ExperimentService: the operations the web layer calls.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use vantage_allocator::Allocator;
use vantage_core::constants::{MAX_EXPERIMENT_NAME_LEN, MAX_TARGET_PATTERN_LEN, SYSTEM_ACTOR};
use vantage_core::errors::{VantageError, VantageErrorCode, VantageResult};
use vantage_core::lifecycle_span;
use vantage_core::models::{
    Assignment, ConfidenceLevel, ConversionOutcome, EventKind, Experiment, ExperimentEvent,
    ExperimentStatus, LifecycleOp, NewExperiment, ResolveOutcome, ResultsReport, Variant,
    WinnerSelection,
};
use vantage_core::traits::IExperimentStorage;
use vantage_core::VantageConfig;
use vantage_evaluator::SignificanceEvaluator;
use vantage_storage::StorageEngine;

use crate::lifecycle::plan_transition;
use crate::targeting::{CompiledMatcher, UrlMatcher};

/// Experiment management, allocation and evaluation over one store.
pub struct ExperimentService {
    store: Arc<dyn IExperimentStorage>,
    allocator: Allocator,
    evaluator: SignificanceEvaluator,
    default_confidence_level: ConfidenceLevel,
    matcher: UrlMatcher,
}

impl ExperimentService {
    /// Service over `store` with default configuration.
    pub fn new(store: Arc<dyn IExperimentStorage>) -> VantageResult<Self> {
        Self::with_config(store, &VantageConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn IExperimentStorage>,
        config: &VantageConfig,
    ) -> VantageResult<Self> {
        Ok(Self {
            allocator: Allocator::from_config(Arc::clone(&store), &config.allocator),
            evaluator: SignificanceEvaluator::from_config(&config.evaluator),
            default_confidence_level: config.evaluator.effective_default_confidence_level()?,
            matcher: UrlMatcher::new(config.targeting.effective_matcher_cache_capacity()),
            store,
        })
    }

    /// Load layered config rooted at `root` and open the configured database.
    pub fn open(root: &Path) -> VantageResult<Self> {
        let config = VantageConfig::load(root)?;
        let store = StorageEngine::from_config(&config.storage)?;
        Self::with_config(Arc::new(store), &config)
    }

    /// Service over a fresh in-memory store.
    pub fn open_in_memory() -> VantageResult<Self> {
        Self::new(Arc::new(StorageEngine::open_in_memory()?))
    }

    pub fn store(&self) -> &Arc<dyn IExperimentStorage> {
        &self.store
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn evaluator(&self) -> &SignificanceEvaluator {
        &self.evaluator
    }

    // --- Experiments ---

    /// Validate and persist a Draft experiment with zeroed counters.
    pub fn create_experiment(&self, new: NewExperiment) -> VantageResult<Experiment> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(VantageError::invalid_argument("name", "must not be empty"));
        }
        if name.chars().count() > MAX_EXPERIMENT_NAME_LEN {
            return Err(VantageError::invalid_argument(
                "name",
                format!("longer than {MAX_EXPERIMENT_NAME_LEN} characters"),
            ));
        }
        if new.target.pattern.is_empty() {
            return Err(VantageError::invalid_argument("target", "pattern must not be empty"));
        }
        if new.target.pattern.len() > MAX_TARGET_PATTERN_LEN {
            return Err(VantageError::invalid_argument(
                "target",
                format!("pattern longer than {MAX_TARGET_PATTERN_LEN} bytes"),
            ));
        }
        new.strategy.validate()?;
        CompiledMatcher::compile(&new.target)?;

        let level = new.confidence_level.unwrap_or(self.default_confidence_level);
        let new = NewExperiment {
            name: name.to_string(),
            ..new
        };
        let experiment = Experiment::from_new(uuid::Uuid::new_v4().to_string(), new, level);
        let event = ExperimentEvent::new(&experiment.id, EventKind::Created).with_details(json!({
                "name": experiment.name,
                "strategy": experiment.strategy,
                "confidence_level": level,
                "target": experiment.target,
            }));
        self.store.create_experiment(&experiment, &event)?;

        tracing::info!(
            experiment_id = %experiment.id,
            name = %experiment.name,
            strategy = experiment.strategy.as_str(),
            "experiment created"
        );
        Ok(experiment)
    }

    pub fn get_experiment(&self, id: &str) -> VantageResult<Experiment> {
        self.store
            .get_experiment(id)?
            .ok_or_else(|| VantageError::ExperimentNotFound { id: id.to_string() })
    }

    pub fn list_experiments(
        &self,
        status: Option<ExperimentStatus>,
    ) -> VantageResult<Vec<Experiment>> {
        self.store.list_experiments(status)
    }

    /// First Active experiment targeting `url`, oldest start first.
    pub fn find_active_for_url(&self, url: &str) -> VantageResult<Option<Experiment>> {
        let mut active = self.store.list_experiments(Some(ExperimentStatus::Active))?;
        active.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        for experiment in active {
            match self.matcher.matches(&experiment.target, url) {
                Ok(true) => return Ok(Some(experiment)),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        experiment_id = %experiment.id,
                        error = %e,
                        "skipping experiment with unusable target"
                    );
                }
            }
        }
        Ok(None)
    }

    // --- Lifecycle ---

    pub fn start(&self, id: &str) -> VantageResult<Experiment> {
        self.transition(id, LifecycleOp::Start, WinnerSelection::None)
    }

    pub fn pause(&self, id: &str) -> VantageResult<Experiment> {
        self.transition(id, LifecycleOp::Pause, WinnerSelection::None)
    }

    pub fn resume(&self, id: &str) -> VantageResult<Experiment> {
        self.transition(id, LifecycleOp::Resume, WinnerSelection::None)
    }

    /// Complete the experiment, settling the winner per `selection`.
    pub fn stop(&self, id: &str, selection: WinnerSelection) -> VantageResult<Experiment> {
        self.transition(id, LifecycleOp::Stop, selection)
    }

    /// Attach a winner to a Completed experiment that does not have one yet.
    pub fn declare_winner(&self, id: &str, winner: Variant) -> VantageResult<Experiment> {
        let _span = lifecycle_span!(id, "declare_winner").entered();
        let experiment = self.get_experiment(id)?;
        if !experiment.status.is_terminal() || experiment.winner.is_some() {
            return Err(VantageError::invalid_state(
                id,
                experiment.status,
                "declare a winner for",
            ));
        }

        let event = ExperimentEvent::new(id, EventKind::WinnerDeclared)
            .with_winner(Some(winner))
            .with_details(json!({ "selection": WinnerSelection::Manual(winner).as_str() }));
        if !self.store.set_winner(id, winner, &event)? {
            let current = self.get_experiment(id)?;
            return Err(VantageError::invalid_state(
                id,
                current.status,
                "declare a winner for",
            ));
        }

        tracing::info!(%winner, "winner declared");
        self.get_experiment(id)
    }

    fn transition(
        &self,
        id: &str,
        op: LifecycleOp,
        selection: WinnerSelection,
    ) -> VantageResult<Experiment> {
        let _span = lifecycle_span!(id, op).entered();
        let experiment = self.get_experiment(id)?;

        let winner = match selection {
            WinnerSelection::None => None,
            WinnerSelection::Manual(variant) => Some(variant),
            WinnerSelection::Evaluated => {
                let report = self.evaluator.evaluate_experiment(&experiment)?;
                if report.recommendation.should_stop {
                    report.recommendation.winner
                } else {
                    None
                }
            }
        };

        let plan = plan_transition(&experiment, op, winner, selection, SYSTEM_ACTOR)?;
        if !self.store.apply_transition(&plan)? {
            // Someone else moved the experiment since we read it.
            let current = self.get_experiment(id)?;
            tracing::warn!(
                expected = %plan.from,
                actual = %current.status,
                "lifecycle transition lost a race"
            );
            return Err(VantageError::invalid_state(id, current.status, op.as_str()));
        }

        tracing::info!(from = %plan.from, to = %plan.to, winner = ?plan.winner, "experiment transitioned");
        self.get_experiment(id)
    }

    // --- Allocation ---

    pub fn resolve_variant(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<ResolveOutcome> {
        self.allocator.resolve_variant(experiment_id, visitor_id)
    }

    /// Variant to render, never failing. Any error serves the control arm.
    pub fn resolve_variant_or_control(&self, experiment_id: &str, visitor_id: &str) -> Variant {
        match self.allocator.resolve_variant(experiment_id, visitor_id) {
            Ok(outcome) => outcome.variant,
            Err(e) => {
                tracing::warn!(
                    experiment_id,
                    error = %e,
                    code = e.error_code(),
                    "serving control variant"
                );
                Variant::CONTROL
            }
        }
    }

    /// Experiment targeting `url` and the visitor's variant in it.
    pub fn variant_for_url(
        &self,
        url: &str,
        visitor_id: &str,
    ) -> VantageResult<Option<(String, Variant)>> {
        let Some(experiment) = self.find_active_for_url(url)? else {
            return Ok(None);
        };
        let outcome = self.allocator.resolve_variant(&experiment.id, visitor_id)?;
        Ok(Some((experiment.id, outcome.variant)))
    }

    pub fn record_conversion(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<ConversionOutcome> {
        self.allocator.record_conversion(experiment_id, visitor_id)
    }

    pub fn get_assignment(&self, experiment_id: &str, visitor_id: &str) -> VantageResult<Assignment> {
        self.get_experiment(experiment_id)?;
        self.store
            .get_assignment(experiment_id, visitor_id)?
            .ok_or_else(|| VantageError::AssignmentNotFound {
                experiment_id: experiment_id.to_string(),
                visitor_id: visitor_id.to_string(),
            })
    }

    // --- Evaluation & audit ---

    /// Results for the experiment's current counters at its own level.
    pub fn evaluate(&self, experiment_id: &str) -> VantageResult<ResultsReport> {
        let experiment = self.get_experiment(experiment_id)?;
        self.evaluator.evaluate_experiment(&experiment)
    }

    pub fn events(&self, experiment_id: &str) -> VantageResult<Vec<ExperimentEvent>> {
        self.get_experiment(experiment_id)?;
        self.store.events(experiment_id)
    }
}
