use super::error_code::{self, VantageErrorCode};

/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("unreadable value in column {column}: {value}")]
    InvalidColumnValue { column: String, value: String },
}

impl VantageErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::SqliteError { .. } | Self::InvalidColumnValue { .. } => {
                error_code::STORAGE_ERROR
            }
        }
    }
}
