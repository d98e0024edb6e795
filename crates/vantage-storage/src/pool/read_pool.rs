//! Read-only connections to the experiment database, handed out in turn.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use vantage_core::config::defaults::MAX_READ_POOL_SIZE;
use vantage_core::errors::VantageResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

pub struct ReadPool {
    slots: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// Open `size` read-only handles on `path`, clamped to `1..=MAX_READ_POOL_SIZE`.
    pub fn open(path: &Path, size: usize) -> VantageResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let slots = (0..size.clamp(1, MAX_READ_POOL_SIZE))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(e.to_string()))?;
                apply_read_pragmas(&conn)?;
                Ok(Mutex::new(conn))
            })
            .collect::<VantageResult<Vec<_>>>()?;
        tracing::debug!(readers = slots.len(), "opened read connections");
        Ok(Self {
            slots,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> VantageResult<T>
    where
        F: FnOnce(&Connection) -> VantageResult<T>,
    {
        let slot = &self.slots[self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len()];
        let conn = slot
            .lock()
            .map_err(|_| to_storage_err("reader lock poisoned".to_string()))?;
        f(&conn)
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }
}
