//! Error handling for Vantage.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod storage_error;
pub mod vantage_error;

pub use config_error::ConfigError;
pub use error_code::VantageErrorCode;
pub use storage_error::StorageError;
pub use vantage_error::{ErrorKind, VantageError};

/// Convenience alias used across the workspace.
pub type VantageResult<T> = Result<T, VantageError>;
