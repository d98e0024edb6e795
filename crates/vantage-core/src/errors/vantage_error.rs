//! Top-level error type for every Vantage operation.

use super::error_code::{self, VantageErrorCode};
use super::{ConfigError, StorageError};
use crate::models::ExperimentStatus;

/// Errors returned by the allocator, evaluator, store, and service.
///
/// Business-rule violations are values of this type, never panics.
/// Infrastructure failures arrive through `StorageError`, `ConfigError`
/// and `SerializationError`.
#[derive(Debug, thiserror::Error)]
pub enum VantageError {
    #[error("experiment not found: {id}")]
    ExperimentNotFound { id: String },

    #[error("visitor {visitor_id} is not assigned in experiment {experiment_id}")]
    AssignmentNotFound {
        experiment_id: String,
        visitor_id: String,
    },

    #[error("cannot {operation} experiment {experiment_id} while it is {status}")]
    InvalidState {
        experiment_id: String,
        status: ExperimentStatus,
        operation: String,
    },

    #[error("visitor {visitor_id} has no assignment in experiment {experiment_id}")]
    ConversionWithoutExposure {
        experiment_id: String,
        visitor_id: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("concurrent assignment for visitor {visitor_id} in experiment {experiment_id}")]
    ConflictRetryable {
        experiment_id: String,
        visitor_id: String,
    },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse classification of a `VantageError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidArgument,
    ConflictRetryable,
    Infrastructure,
}

impl VantageError {
    /// Shorthand for an `InvalidArgument` error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an `InvalidState` error.
    pub fn invalid_state(
        experiment_id: impl Into<String>,
        status: ExperimentStatus,
        operation: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            experiment_id: experiment_id.into(),
            status,
            operation: operation.into(),
        }
    }

    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExperimentNotFound { .. } | Self::AssignmentNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::InvalidState { .. } | Self::ConversionWithoutExposure { .. } => {
                ErrorKind::InvalidState
            }
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::ConflictRetryable { .. } => ErrorKind::ConflictRetryable,
            Self::StorageError(_) | Self::ConfigError(_) | Self::SerializationError(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// True for failures of the environment rather than of the request.
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

impl VantageErrorCode for VantageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ExperimentNotFound { .. } => error_code::EXPERIMENT_NOT_FOUND,
            Self::AssignmentNotFound { .. } => error_code::ASSIGNMENT_NOT_FOUND,
            Self::InvalidState { .. } => error_code::INVALID_STATE,
            Self::ConversionWithoutExposure { .. } => error_code::CONVERSION_WITHOUT_EXPOSURE,
            Self::InvalidArgument { .. } => error_code::INVALID_ARGUMENT,
            Self::ConflictRetryable { .. } => error_code::CONFLICT_RETRYABLE,
            Self::StorageError(e) => e.error_code(),
            Self::ConfigError(e) => e.error_code(),
            Self::SerializationError(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}
