//! # vantage-experiments
//!
//! Service layer tying the store, allocator and evaluator together:
//! experiment creation and validation, the lifecycle state machine,
//! URL targeting, and winner declaration.

pub mod lifecycle;
pub mod service;
pub mod targeting;

pub use service::ExperimentService;
pub use targeting::{CompiledMatcher, UrlMatcher};
