//! Stop/continue decision from a completed significance test.

use vantage_core::constants::reasons;
use vantage_core::models::{Recommendation, Variant, VariantCounts};

/// Decide whether the experiment can stop and which arm won.
///
/// Sample size is checked first: an arm below `min_visits_per_variant`
/// always yields "insufficient sample size", whatever the z-score says.
pub fn recommend(
    counts: &VariantCounts,
    is_significant: bool,
    min_visits_per_variant: u64,
) -> Recommendation {
    if counts.a.visits < min_visits_per_variant || counts.b.visits < min_visits_per_variant {
        return Recommendation {
            should_stop: false,
            winner: None,
            reason: reasons::INSUFFICIENT_SAMPLE.to_string(),
        };
    }

    let rate_a = counts.a.conversion_rate();
    let rate_b = counts.b.conversion_rate();
    let winner = if !is_significant {
        None
    } else if rate_b > rate_a {
        Some(Variant::B)
    } else if rate_a > rate_b {
        Some(Variant::A)
    } else {
        None
    };

    match winner {
        Some(Variant::B) => Recommendation {
            should_stop: true,
            winner,
            reason: reasons::B_OUTPERFORMS_A.to_string(),
        },
        Some(Variant::A) => Recommendation {
            should_stop: true,
            winner,
            reason: reasons::A_OUTPERFORMS_B.to_string(),
        },
        None => Recommendation {
            should_stop: false,
            winner: None,
            reason: reasons::CONTINUE_TEST.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_applies_to_each_arm() {
        let counts = VariantCounts::new(99, 0, 5000, 4000);
        let rec = recommend(&counts, true, 100);
        assert!(!rec.should_stop);
        assert_eq!(rec.winner, None);
        assert_eq!(rec.reason, reasons::INSUFFICIENT_SAMPLE);
    }

    #[test]
    fn significant_lower_arm_loses() {
        let counts = VariantCounts::new(1000, 200, 1000, 100);
        let rec = recommend(&counts, true, 100);
        assert_eq!(rec.winner, Some(Variant::A));
        assert_eq!(rec.reason, reasons::A_OUTPERFORMS_B);
    }

    #[test]
    fn not_significant_continues() {
        let counts = VariantCounts::new(1000, 100, 1000, 105);
        let rec = recommend(&counts, false, 100);
        assert!(!rec.should_stop);
        assert_eq!(rec.reason, reasons::CONTINUE_TEST);
    }
}
