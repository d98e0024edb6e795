//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. Default: `vantage.db`.
    pub db_path: Option<String>,
    /// Number of read connections. Default: 4, max 8.
    pub read_pool_size: Option<usize>,
}

impl StorageConfig {
    pub fn effective_db_path(&self) -> PathBuf {
        PathBuf::from(
            self.db_path
                .as_deref()
                .unwrap_or(defaults::DEFAULT_DB_FILE),
        )
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size
            .unwrap_or(defaults::DEFAULT_READ_POOL_SIZE)
    }
}
