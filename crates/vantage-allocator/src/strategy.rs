//! Variant selection for a visitor seen for the first time.

use rand::Rng;

use vantage_core::models::{AssignmentStrategy, Variant};

/// Pick a variant under `strategy`.
///
/// `assignment_count` is the number of assignments already stored for the
/// experiment and only matters for `Alternating`.
pub fn pick_variant<R: Rng + ?Sized>(
    strategy: AssignmentStrategy,
    assignment_count: u64,
    rng: &mut R,
) -> Variant {
    match strategy {
        AssignmentStrategy::Alternating => {
            if assignment_count % 2 == 0 {
                Variant::A
            } else {
                Variant::B
            }
        }
        AssignmentStrategy::CustomSplit { .. } | AssignmentStrategy::FiftyFifty => {
            // gen_bool(1.0) and gen_bool(0.0) are exact, so 100/0 splits never leak.
            if rng.gen_bool(strategy.probability_a()) {
                Variant::A
            } else {
                Variant::B
            }
        }
    }
}
