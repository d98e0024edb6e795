use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ConfidenceLevel, Variant};

/// Per-arm figures in a results report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantResult {
    pub variant: Variant,
    pub visits: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    /// Lower bound of the rate's confidence interval at the report's level.
    pub ci_low: f64,
    pub ci_high: f64,
}

/// What the dashboard should do with the experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub should_stop: bool,
    pub winner: Option<Variant>,
    pub reason: String,
}

/// Computed on read from aggregate counters. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultsReport {
    pub experiment_id: Option<String>,
    #[ts(type = "number")]
    pub confidence_level: ConfidenceLevel,
    pub a: VariantResult,
    pub b: VariantResult,
    /// (rateB - rateA) / rateA × 100, with 100 / 0 when rateA is 0.
    pub improvement_percent: f64,
    pub z_score: f64,
    /// Two-tailed p-value of the z-test.
    pub p_value: f64,
    pub is_significant: bool,
    pub recommendation: Recommendation,
}
