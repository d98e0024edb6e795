use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ExperimentStatus, LifecycleOp, Variant};
use crate::constants::SYSTEM_ACTOR;

/// What happened to an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EventKind {
    Created,
    Started,
    Paused,
    Resumed,
    Stopped,
    WinnerDeclared,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::Stopped => "stopped",
            Self::WinnerDeclared => "winner_declared",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "started" => Some(Self::Started),
            "paused" => Some(Self::Paused),
            "resumed" => Some(Self::Resumed),
            "stopped" => Some(Self::Stopped),
            "winner_declared" => Some(Self::WinnerDeclared),
            _ => None,
        }
    }
}

impl From<LifecycleOp> for EventKind {
    fn from(op: LifecycleOp) -> Self {
        match op {
            LifecycleOp::Start => Self::Started,
            LifecycleOp::Pause => Self::Paused,
            LifecycleOp::Resume => Self::Resumed,
            LifecycleOp::Stop => Self::Stopped,
        }
    }
}

/// Append-only audit entry for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExperimentEvent {
    /// Assigned by the store. Zero until persisted.
    pub id: i64,
    pub experiment_id: String,
    pub kind: EventKind,
    pub from_status: Option<ExperimentStatus>,
    pub to_status: Option<ExperimentStatus>,
    pub winner: Option<Variant>,
    pub actor: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ExperimentEvent {
    pub fn new(experiment_id: &str, kind: EventKind) -> Self {
        Self {
            id: 0,
            experiment_id: experiment_id.to_string(),
            kind,
            from_status: None,
            to_status: None,
            winner: None,
            actor: SYSTEM_ACTOR.to_string(),
            details: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    pub fn with_statuses(mut self, from: ExperimentStatus, to: ExperimentStatus) -> Self {
        self.from_status = Some(from);
        self.to_status = Some(to);
        self
    }

    pub fn with_winner(mut self, winner: Option<Variant>) -> Self {
        self.winner = winner;
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
