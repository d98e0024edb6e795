//! Writer plus optional readers. A file-backed store gets a reader set
//! that WAL keeps unblocked by the writer; an in-memory store has one
//! connection that serves both sides.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::Path;

use rusqlite::Connection;

use vantage_core::errors::VantageResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` for in-memory stores; a private `:memory:` reader would see an empty database.
    pub readers: Option<ReadPool>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> VantageResult<Self> {
        // Writer first so the file and its WAL exist before read-only opens.
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers: Some(readers),
        })
    }

    pub fn open_in_memory() -> VantageResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
        })
    }

    /// Run a read-only closure on a reader when one exists, else on the writer.
    pub fn read<F, T>(&self, f: F) -> VantageResult<T>
    where
        F: FnOnce(&Connection) -> VantageResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn_sync(f),
        }
    }

    /// Reader count; zero when reads share the writer.
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
