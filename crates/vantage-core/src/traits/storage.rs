use chrono::{DateTime, Utc};

use crate::errors::VantageResult;
use crate::models::{
    Assignment, Experiment, ExperimentEvent, ExperimentStatus, StatusTransition, Variant,
    VariantCounts,
};

/// Outcome of a conditional conversion write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionWrite {
    /// Flag flipped and counter incremented.
    Recorded(Variant),
    /// The visitor had already converted; nothing changed.
    AlreadyConverted(Variant),
    /// No assignment exists for the visitor.
    NoAssignment,
}

/// Record store for experiments, assignments, and their audit trail.
///
/// Counter updates are atomic increments inside the same transaction as the
/// row they account for; implementations never read-modify-write counters.
pub trait IExperimentStorage: Send + Sync {
    // --- Experiments ---
    fn create_experiment(&self, experiment: &Experiment, event: &ExperimentEvent)
        -> VantageResult<()>;
    fn get_experiment(&self, id: &str) -> VantageResult<Option<Experiment>>;
    fn list_experiments(&self, status: Option<ExperimentStatus>) -> VantageResult<Vec<Experiment>>;
    /// Compare-and-set on status. Returns false when the experiment was not in `from`.
    fn apply_transition(&self, transition: &StatusTransition) -> VantageResult<bool>;
    /// Attach a winner to a Completed experiment that has none. Returns false otherwise.
    fn set_winner(
        &self,
        experiment_id: &str,
        winner: Variant,
        event: &ExperimentEvent,
    ) -> VantageResult<bool>;
    fn counts(&self, experiment_id: &str) -> VantageResult<Option<VariantCounts>>;

    // --- Assignments ---
    fn get_assignment(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<Option<Assignment>>;
    fn assignment_count(&self, experiment_id: &str) -> VantageResult<u64>;
    /// Insert the assignment and count its visit in one transaction.
    ///
    /// Fails with `ConflictRetryable` when the (experiment, visitor) pair already
    /// exists, `InvalidState` when the experiment is not Active, and
    /// `ExperimentNotFound` when it does not exist.
    fn insert_assignment(&self, assignment: &Assignment) -> VantageResult<()>;
    /// Flip the converted flag and count the conversion at most once.
    fn mark_converted(
        &self,
        experiment_id: &str,
        visitor_id: &str,
        at: DateTime<Utc>,
    ) -> VantageResult<ConversionWrite>;

    // --- Audit ---
    fn events(&self, experiment_id: &str) -> VantageResult<Vec<ExperimentEvent>>;
}
