use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Variant;

/// The durable binding of one visitor to one arm of one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Assignment {
    pub experiment_id: String,
    pub visitor_id: String,
    pub variant: Variant,
    pub assigned_at: DateTime<Utc>,
    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(experiment_id: &str, visitor_id: &str, variant: Variant) -> Self {
        Self {
            experiment_id: experiment_id.to_string(),
            visitor_id: visitor_id.to_string(),
            variant,
            assigned_at: Utc::now(),
            converted: false,
            converted_at: None,
        }
    }
}

/// Result of `resolve_variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolveOutcome {
    pub variant: Variant,
    pub is_new_assignment: bool,
}

/// Result of `record_conversion`. `recorded` is false for repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversionOutcome {
    pub recorded: bool,
}
