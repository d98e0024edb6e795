//! The single serialized write connection.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use vantage_core::errors::VantageResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// All writes go through this one connection, one closure at a time.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> VantageResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> VantageResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the write lock.
    pub fn with_conn_sync<F, T>(&self, f: F) -> VantageResult<T>
    where
        F: FnOnce(&Connection) -> VantageResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| to_storage_err("write lock poisoned".to_string()))?;
        f(&guard)
    }
}
