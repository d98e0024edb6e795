//! Significance evaluator configuration.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::VantageResult;
use crate::models::ConfidenceLevel;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Level given to experiments created without one. Default: 95.
    pub default_confidence_level: Option<u8>,
    /// Visits each arm needs before significance is trusted. Default: 100.
    pub min_visits_per_variant: Option<u64>,
}

impl EvaluatorConfig {
    pub fn effective_default_confidence_level(&self) -> VantageResult<ConfidenceLevel> {
        ConfidenceLevel::try_from(
            self.default_confidence_level
                .unwrap_or(defaults::DEFAULT_CONFIDENCE_LEVEL),
        )
    }

    pub fn effective_min_visits_per_variant(&self) -> u64 {
        self.min_visits_per_variant
            .unwrap_or(defaults::DEFAULT_MIN_VISITS_PER_VARIANT)
    }
}
