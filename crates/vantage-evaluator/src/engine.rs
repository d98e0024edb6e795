//! SignificanceEvaluator: builds a `ResultsReport` from counters.

use vantage_core::config::EvaluatorConfig;
use vantage_core::errors::{VantageError, VantageResult};
use vantage_core::evaluation_span;
use vantage_core::models::{
    ConfidenceLevel, Experiment, ResultsReport, Variant, VariantCounts, VariantResult,
    VariantStats,
};

use crate::recommendation::recommend;
use crate::significance;

/// Stateless apart from the per-variant sample-size floor.
/// Identical inputs always give identical reports.
#[derive(Debug, Clone, Copy)]
pub struct SignificanceEvaluator {
    min_visits_per_variant: u64,
}

impl Default for SignificanceEvaluator {
    fn default() -> Self {
        Self::from_config(&EvaluatorConfig::default())
    }
}

impl SignificanceEvaluator {
    pub fn new(min_visits_per_variant: u64) -> Self {
        Self {
            min_visits_per_variant,
        }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.effective_min_visits_per_variant())
    }

    pub fn min_visits_per_variant(&self) -> u64 {
        self.min_visits_per_variant
    }

    /// Evaluate raw counters at `level`.
    pub fn evaluate(
        &self,
        counts: &VariantCounts,
        level: ConfidenceLevel,
    ) -> VantageResult<ResultsReport> {
        check_counts(Variant::A, counts.a)?;
        check_counts(Variant::B, counts.b)?;

        let critical = level.critical_z();
        let rate_a = counts.a.conversion_rate();
        let rate_b = counts.b.conversion_rate();
        let z = significance::z_score(counts.a, counts.b);
        let enough_data = counts.a.visits >= self.min_visits_per_variant
            && counts.b.visits >= self.min_visits_per_variant;
        let is_significant = enough_data && z.abs() >= critical;

        Ok(ResultsReport {
            experiment_id: None,
            confidence_level: level,
            a: variant_result(Variant::A, counts.a, critical),
            b: variant_result(Variant::B, counts.b, critical),
            improvement_percent: significance::improvement_percent(rate_a, rate_b),
            z_score: z,
            p_value: significance::two_tailed_p_value(z),
            is_significant,
            recommendation: recommend(counts, is_significant, self.min_visits_per_variant),
        })
    }

    /// Evaluate with a confidence level given as a percentage (90, 95 or 99).
    pub fn evaluate_at_percent(
        &self,
        counts: &VariantCounts,
        percent: u8,
    ) -> VantageResult<ResultsReport> {
        self.evaluate(counts, ConfidenceLevel::try_from(percent)?)
    }

    /// Evaluate an experiment's current counters at its own confidence level.
    pub fn evaluate_experiment(&self, experiment: &Experiment) -> VantageResult<ResultsReport> {
        let _span = evaluation_span!(experiment.id).entered();
        let mut report = self.evaluate(&experiment.counts, experiment.confidence_level)?;
        report.experiment_id = Some(experiment.id.clone());
        tracing::debug!(
            z = report.z_score,
            p = report.p_value,
            significant = report.is_significant,
            "evaluated experiment"
        );
        Ok(report)
    }
}

fn check_counts(variant: Variant, stats: VariantStats) -> VantageResult<()> {
    if stats.conversions > stats.visits {
        return Err(VantageError::invalid_argument(
            "counts",
            format!(
                "variant {variant} has {} conversions for {} visits",
                stats.conversions, stats.visits
            ),
        ));
    }
    Ok(())
}

fn variant_result(variant: Variant, stats: VariantStats, critical: f64) -> VariantResult {
    let (ci_low, ci_high) = significance::wald_interval(stats, critical);
    VariantResult {
        variant,
        visits: stats.visits,
        conversions: stats.conversions,
        conversion_rate: stats.conversion_rate(),
        ci_low,
        ci_high,
    }
}
