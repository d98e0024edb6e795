//! # vantage-evaluator
//!
//! Pure significance evaluation over aggregate counters.
//! Two-proportion z-test with pooled standard error, two-tailed p-value,
//! per-variant Wald intervals, and a stop/continue recommendation.

pub mod engine;
pub mod recommendation;
pub mod significance;

pub use engine::SignificanceEvaluator;
pub use recommendation::recommend;
