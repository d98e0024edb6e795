//! Subscriber initialisation and span definitions per operation.
//!
//! Filter comes from `VANTAGE_LOG`, then `RUST_LOG`, then `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "VANTAGE_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global fmt subscriber. Returns false if one was already set.
pub fn init_tracing(json: bool) -> bool {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_ok() {
        tracing::debug!(version = crate::constants::VERSION, "tracing initialised");
    }
    result.is_ok()
}

/// Create an assignment span.
#[macro_export]
macro_rules! assignment_span {
    ($experiment_id:expr, $visitor_id:expr) => {
        tracing::debug_span!("vantage.assignment", experiment_id = %$experiment_id, visitor_id = %$visitor_id)
    };
}

/// Create a conversion span.
#[macro_export]
macro_rules! conversion_span {
    ($experiment_id:expr, $visitor_id:expr) => {
        tracing::debug_span!("vantage.conversion", experiment_id = %$experiment_id, visitor_id = %$visitor_id)
    };
}

/// Create an evaluation span.
#[macro_export]
macro_rules! evaluation_span {
    ($experiment_id:expr) => {
        tracing::info_span!("vantage.evaluation", experiment_id = %$experiment_id)
    };
}

/// Create a lifecycle span.
#[macro_export]
macro_rules! lifecycle_span {
    ($experiment_id:expr, $op:expr) => {
        tracing::info_span!("vantage.lifecycle", experiment_id = %$experiment_id, op = %$op)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ASSIGNMENT: &str = "vantage.assignment";
    pub const CONVERSION: &str = "vantage.conversion";
    pub const EVALUATION: &str = "vantage.evaluation";
    pub const LIFECYCLE: &str = "vantage.lifecycle";
}
