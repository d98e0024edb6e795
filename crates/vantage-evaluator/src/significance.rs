//! Two-proportion z-test via `statrs`.
//!
//! Pooled rate: p = (cA + cB) / (vA + vB).
//! Standard error: sqrt(p(1 - p)(1/vA + 1/vB)).
//! z = (rateB - rateA) / se, two-tailed p = erfc(|z| / sqrt 2) = 2(1 - Φ(|z|)).

use statrs::function::erf::erfc;

use vantage_core::models::VariantStats;

/// Relative lift of B over A in percent.
///
/// When A never converted the ratio is undefined; report 100 if B did
/// convert and 0 otherwise.
pub fn improvement_percent(rate_a: f64, rate_b: f64) -> f64 {
    if rate_a > 0.0 {
        (rate_b - rate_a) / rate_a * 100.0
    } else if rate_b > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// z statistic of B versus A. Zero when either arm is empty or the pooled
/// standard error vanishes (both arms at 0% or both at 100%).
pub fn z_score(a: VariantStats, b: VariantStats) -> f64 {
    if a.visits == 0 || b.visits == 0 {
        return 0.0;
    }
    let va = a.visits as f64;
    let vb = b.visits as f64;
    // Summed as f64: the u64 sum can overflow near u64::MAX.
    let pooled = (a.conversions as f64 + b.conversions as f64) / (va + vb);
    let se = (pooled * (1.0 - pooled) * (1.0 / va + 1.0 / vb)).sqrt();
    if se <= 0.0 || !se.is_finite() {
        return 0.0;
    }
    let z = (b.conversion_rate() - a.conversion_rate()) / se;
    if z.is_finite() {
        z
    } else {
        0.0
    }
}

/// Two-tailed p-value for a standard normal statistic.
pub fn two_tailed_p_value(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
}

/// Wald interval `rate ± critical·sqrt(rate(1 - rate)/visits)`, clamped to
/// [0, 1]. `(0, 0)` for an arm with no visits.
pub fn wald_interval(stats: VariantStats, critical_z: f64) -> (f64, f64) {
    if stats.visits == 0 {
        return (0.0, 0.0);
    }
    let rate = stats.conversion_rate();
    let half_width = critical_z * (rate * (1.0 - rate) / stats.visits as f64).sqrt();
    (
        (rate - half_width).clamp(0.0, 1.0),
        (rate + half_width).clamp(0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(visits: u64, conversions: u64) -> VariantStats {
        VariantStats::new(visits, conversions)
    }

    #[test]
    fn improvement_handles_zero_baseline() {
        assert_eq!(improvement_percent(0.0, 0.0), 0.0);
        assert_eq!(improvement_percent(0.0, 0.2), 100.0);
        assert!((improvement_percent(0.1, 0.15) - 50.0).abs() < 1e-9);
        assert!((improvement_percent(0.2, 0.1) + 50.0).abs() < 1e-9);
    }

    #[test]
    fn z_matches_hand_computation() {
        // p = 0.125, se = sqrt(0.125 * 0.875 * 0.002) ≈ 0.014790
        let z = z_score(stats(1000, 100), stats(1000, 150));
        assert!((z - 3.3806).abs() < 1e-3, "z = {z}");
    }

    #[test]
    fn z_is_antisymmetric() {
        let a = stats(400, 40);
        let b = stats(500, 70);
        assert!((z_score(a, b) + z_score(b, a)).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_give_zero_z() {
        assert_eq!(z_score(stats(0, 0), stats(100, 10)), 0.0);
        assert_eq!(z_score(stats(100, 0), stats(100, 0)), 0.0);
        assert_eq!(z_score(stats(100, 100), stats(100, 100)), 0.0);
    }

    #[test]
    fn p_value_at_known_points() {
        assert!((two_tailed_p_value(0.0) - 1.0).abs() < 1e-12);
        assert!((two_tailed_p_value(1.96) - 0.05).abs() < 1e-3);
        assert!((two_tailed_p_value(-2.576) - 0.01).abs() < 1e-3);
        assert!(two_tailed_p_value(40.0) >= 0.0);
    }

    #[test]
    fn wald_interval_contains_rate_and_stays_in_bounds() {
        let (lo, hi) = wald_interval(stats(1000, 100), 1.96);
        assert!(lo < 0.1 && 0.1 < hi);
        assert!((hi - lo - 2.0 * 1.96 * (0.09f64 / 1000.0).sqrt()).abs() < 1e-9);

        assert_eq!(wald_interval(stats(0, 0), 1.96), (0.0, 0.0));
        let (lo, hi) = wald_interval(stats(3, 3), 2.576);
        assert_eq!((lo, hi), (1.0, 1.0));
        let (lo, _) = wald_interval(stats(10, 1), 2.576);
        assert_eq!(lo, 0.0);
    }
}
