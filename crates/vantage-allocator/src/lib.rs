//! # vantage-allocator
//!
//! Sticky assignment of visitors to variants, and conversion recording.
//! A visitor keeps the first variant they were given for the lifetime of
//! the experiment; visit and conversion counters are maintained by the
//! store inside the same write as the assignment row.

pub mod engine;
pub mod strategy;

pub use engine::Allocator;
pub use strategy::pick_variant;
