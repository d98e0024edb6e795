//! # vantage-core
//!
//! Foundation crate for the Vantage experiment engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VantageConfig;
pub use errors::{ErrorKind, VantageError, VantageResult};
pub use models::{
    AssignmentStrategy, ConfidenceLevel, Experiment, ExperimentStatus, LifecycleOp, Variant,
    VariantCounts,
};
