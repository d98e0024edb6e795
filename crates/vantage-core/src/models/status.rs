use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use super::{ExperimentEvent, Variant};

/// Lifecycle state of an experiment.
///
/// Draft → Active ⇄ Paused → Completed. Nothing leaves Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ExperimentStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl ExperimentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Completed is the only terminal state.
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }

    /// New visitors may only be assigned while Active.
    pub fn accepts_assignments(self) -> bool {
        self == Self::Active
    }

    /// Paused experiments keep recording conversions for visitors already exposed.
    pub fn accepts_conversions(self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    /// The state reached by applying `op`, or `None` if the transition is not allowed.
    pub fn next(self, op: LifecycleOp) -> Option<Self> {
        match (self, op) {
            (Self::Draft, LifecycleOp::Start) => Some(Self::Active),
            (Self::Active, LifecycleOp::Pause) => Some(Self::Paused),
            (Self::Paused, LifecycleOp::Resume) => Some(Self::Active),
            (Self::Active | Self::Paused, LifecycleOp::Stop) => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleOp {
    Start,
    Pause,
    Resume,
    Stop,
}

impl LifecycleOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compare-and-set status change handed to the store.
/// Applied only if the experiment is still in `from`.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub experiment_id: String,
    pub from: ExperimentStatus,
    pub to: ExperimentStatus,
    pub winner: Option<Variant>,
    pub at: DateTime<Utc>,
    /// Audit event written in the same transaction.
    pub event: ExperimentEvent,
}
