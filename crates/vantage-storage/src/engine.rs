//! StorageEngine: owns ConnectionPool, implements IExperimentStorage,
//! runs migrations on open.

use std::path::Path;

use chrono::{DateTime, Utc};

use vantage_core::config::StorageConfig;
use vantage_core::errors::VantageResult;
use vantage_core::models::{
    Assignment, Experiment, ExperimentEvent, ExperimentStatus, StatusTransition, Variant,
    VariantCounts,
};
use vantage_core::traits::{ConversionWrite, IExperimentStorage};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{assignment_ops, event_ops, experiment_crud};

/// The main storage engine. Owns the connection pool and provides
/// the full IExperimentStorage interface.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> VantageResult<Self> {
        Self::open_with_pool_size(path, StorageConfig::default().effective_read_pool_size())
    }

    /// Open a storage engine using the `[storage]` config section.
    pub fn from_config(config: &StorageConfig) -> VantageResult<Self> {
        Self::open_with_pool_size(
            &config.effective_db_path(),
            config.effective_read_pool_size(),
        )
    }

    /// Open a file-backed engine with an explicit read pool size.
    pub fn open_with_pool_size(path: &Path, read_pool_size: usize) -> VantageResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self { pool };
        engine.initialize()?;
        tracing::info!(path = %path.display(), read_pool_size, "opened experiment store");
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> VantageResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations.
    fn initialize(&self) -> VantageResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> VantageResult<u32> {
        self.pool
            .writer
            .with_conn_sync(migrations::current_version)
    }

    fn with_reader<F, T>(&self, f: F) -> VantageResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> VantageResult<T>,
    {
        self.pool.read(f)
    }
}

impl IExperimentStorage for StorageEngine {
    fn create_experiment(
        &self,
        experiment: &Experiment,
        event: &ExperimentEvent,
    ) -> VantageResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| experiment_crud::insert_experiment(conn, experiment, event))
    }

    fn get_experiment(&self, id: &str) -> VantageResult<Option<Experiment>> {
        self.with_reader(|conn| experiment_crud::get_experiment(conn, id))
    }

    fn list_experiments(&self, status: Option<ExperimentStatus>) -> VantageResult<Vec<Experiment>> {
        self.with_reader(|conn| experiment_crud::list_experiments(conn, status))
    }

    fn apply_transition(&self, transition: &StatusTransition) -> VantageResult<bool> {
        self.pool
            .writer
            .with_conn_sync(|conn| experiment_crud::apply_transition(conn, transition))
    }

    fn set_winner(
        &self,
        experiment_id: &str,
        winner: Variant,
        event: &ExperimentEvent,
    ) -> VantageResult<bool> {
        self.pool
            .writer
            .with_conn_sync(|conn| experiment_crud::set_winner(conn, experiment_id, winner, event))
    }

    fn counts(&self, experiment_id: &str) -> VantageResult<Option<VariantCounts>> {
        self.with_reader(|conn| experiment_crud::get_counts(conn, experiment_id))
    }

    fn get_assignment(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<Option<Assignment>> {
        self.with_reader(|conn| assignment_ops::get_assignment(conn, experiment_id, visitor_id))
    }

    fn assignment_count(&self, experiment_id: &str) -> VantageResult<u64> {
        self.with_reader(|conn| assignment_ops::count_assignments(conn, experiment_id))
    }

    fn insert_assignment(&self, assignment: &Assignment) -> VantageResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| assignment_ops::insert_assignment(conn, assignment))
    }

    fn mark_converted(
        &self,
        experiment_id: &str,
        visitor_id: &str,
        at: DateTime<Utc>,
    ) -> VantageResult<ConversionWrite> {
        self.pool.writer.with_conn_sync(|conn| {
            assignment_ops::mark_converted(conn, experiment_id, visitor_id, at)
        })
    }

    fn events(&self, experiment_id: &str) -> VantageResult<Vec<ExperimentEvent>> {
        self.with_reader(|conn| event_ops::list_events(conn, experiment_id))
    }
}
