use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{
    AssignmentStrategy, ConfidenceLevel, ExperimentStatus, LifecycleOp, UrlTarget, Variant,
};
use crate::errors::{VantageError, VantageResult};

/// Visits and conversions for one arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantStats {
    pub visits: u64,
    pub conversions: u64,
}

impl VariantStats {
    pub fn new(visits: u64, conversions: u64) -> Self {
        Self {
            visits,
            conversions,
        }
    }

    /// conversions / visits, 0 when there are no visits.
    pub fn conversion_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.conversions as f64 / self.visits as f64
        }
    }
}

/// Aggregate counters for both arms of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantCounts {
    pub a: VariantStats,
    pub b: VariantStats,
}

impl VariantCounts {
    pub fn new(visits_a: u64, conversions_a: u64, visits_b: u64, conversions_b: u64) -> Self {
        Self {
            a: VariantStats::new(visits_a, conversions_a),
            b: VariantStats::new(visits_b, conversions_b),
        }
    }

    pub fn get(&self, variant: Variant) -> VariantStats {
        match variant {
            Variant::A => self.a,
            Variant::B => self.b,
        }
    }

    pub fn total_visits(&self) -> u64 {
        self.a.visits.saturating_add(self.b.visits)
    }

    pub fn total_conversions(&self) -> u64 {
        self.a.conversions.saturating_add(self.b.conversions)
    }
}

/// A two-arm experiment and its running counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub target: UrlTarget,
    pub status: ExperimentStatus,
    pub strategy: AssignmentStrategy,
    #[ts(type = "number")]
    pub confidence_level: ConfidenceLevel,
    pub counts: VariantCounts,
    /// Only ever set once the experiment is Completed.
    pub winner: Option<Variant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// First activation. Resuming does not move it.
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Experiment {
    /// Build a Draft experiment with zeroed counters from a validated request.
    pub fn from_new(id: String, new: NewExperiment, confidence_level: ConfidenceLevel) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            description: new.description,
            target: new.target,
            status: ExperimentStatus::Draft,
            strategy: new.strategy,
            confidence_level,
            counts: VariantCounts::default(),
            winner: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
        }
    }

    /// Target status for `op`, or `InvalidState` when the lifecycle forbids it.
    pub fn next_status(&self, op: LifecycleOp) -> VantageResult<ExperimentStatus> {
        self.status
            .next(op)
            .ok_or_else(|| VantageError::invalid_state(&self.id, self.status, op.as_str()))
    }
}

/// Creation request for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExperiment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target: UrlTarget,
    #[serde(default)]
    pub strategy: AssignmentStrategy,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub confidence_level: Option<ConfidenceLevel>,
}

impl NewExperiment {
    pub fn new(name: impl Into<String>, target: UrlTarget) -> Self {
        Self {
            name: name.into(),
            description: None,
            target,
            strategy: AssignmentStrategy::default(),
            confidence_level: None,
        }
    }

    pub fn with_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_confidence_level(mut self, level: ConfidenceLevel) -> Self {
        self.confidence_level = Some(level);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
