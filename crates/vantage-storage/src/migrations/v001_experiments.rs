//! v001: experiments with inline per-variant counters.

use rusqlite::Connection;

use vantage_core::errors::VantageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VantageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS experiments (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            description      TEXT,
            target_pattern   TEXT NOT NULL,
            match_type       TEXT NOT NULL CHECK (match_type IN ('exact', 'wildcard', 'regex')),
            status           TEXT NOT NULL CHECK (status IN ('draft', 'active', 'paused', 'completed')),
            strategy         TEXT NOT NULL,
            split_a          INTEGER CHECK (split_a BETWEEN 0 AND 100),
            confidence_level INTEGER NOT NULL CHECK (confidence_level IN (90, 95, 99)),
            visits_a         INTEGER NOT NULL DEFAULT 0,
            conversions_a    INTEGER NOT NULL DEFAULT 0,
            visits_b         INTEGER NOT NULL DEFAULT 0,
            conversions_b    INTEGER NOT NULL DEFAULT 0,
            winner           TEXT CHECK (winner IN ('A', 'B')),
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            started_at       TEXT,
            ended_at         TEXT,
            CHECK (conversions_a <= visits_a),
            CHECK (conversions_b <= visits_b)
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_experiments_status ON experiments(status);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
