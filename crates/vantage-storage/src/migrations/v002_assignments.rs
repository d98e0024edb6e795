//! v002: one assignment row per (experiment, visitor).
//! The primary key is the uniqueness guard for concurrent first visits.

use rusqlite::Connection;

use vantage_core::errors::VantageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VantageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS experiment_assignments (
            experiment_id TEXT NOT NULL REFERENCES experiments(id) ON DELETE CASCADE,
            visitor_id    TEXT NOT NULL,
            variant       TEXT NOT NULL CHECK (variant IN ('A', 'B')),
            assigned_at   TEXT NOT NULL,
            converted     INTEGER NOT NULL DEFAULT 0 CHECK (converted IN (0, 1)),
            converted_at  TEXT,
            PRIMARY KEY (experiment_id, visitor_id)
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_assignments_variant
            ON experiment_assignments(experiment_id, variant);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
