//! v003: append-only lifecycle audit trail.

use rusqlite::Connection;

use vantage_core::errors::VantageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VantageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS experiment_events (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            experiment_id TEXT NOT NULL REFERENCES experiments(id) ON DELETE CASCADE,
            kind          TEXT NOT NULL,
            from_status   TEXT,
            to_status     TEXT,
            winner        TEXT,
            actor         TEXT NOT NULL DEFAULT 'system',
            details       TEXT NOT NULL DEFAULT '{}',
            timestamp     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_experiment ON experiment_events(experiment_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
