//! Stable error codes handed to the web layer.

/// Maps an error to a stable, machine-readable code.
pub trait VantageErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const EXPERIMENT_NOT_FOUND: &str = "EXPERIMENT_NOT_FOUND";
pub const ASSIGNMENT_NOT_FOUND: &str = "ASSIGNMENT_NOT_FOUND";
pub const INVALID_STATE: &str = "INVALID_STATE";
pub const CONVERSION_WITHOUT_EXPOSURE: &str = "CONVERSION_WITHOUT_EXPOSURE";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const CONFLICT_RETRYABLE: &str = "CONFLICT_RETRYABLE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
