//! # vantage-storage
//!
//! SQLite persistence for the experiment engine: a serialized writer plus a
//! read pool, versioned migrations, and the queries behind `IExperimentStorage`.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use vantage_core::errors::{StorageError, VantageError};

/// Wrap a SQLite failure message into the workspace error type.
pub(crate) fn to_storage_err(message: String) -> VantageError {
    VantageError::StorageError(StorageError::SqliteError { message })
}
