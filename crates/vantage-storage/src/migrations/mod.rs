//! Versioned schema migrations tracked in `schema_version`.

mod v001_experiments;
mod v002_assignments;
mod v003_experiment_events;

use rusqlite::{params, Connection};

use vantage_core::errors::{StorageError, VantageResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> VantageResult<()>;

/// All migrations in application order.
const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[
    (1, "experiments", v001_experiments::migrate),
    (2, "assignments", v002_assignments::migrate),
    (3, "experiment_events", v003_experiment_events::migrate),
];

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the stored schema version.
/// Each migration runs in its own transaction together with its version row.
pub fn run_migrations(conn: &Connection) -> VantageResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    let mut applied = current;

    for &(version, name, migrate) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("migration v{version:03} begin: {e}")))?;

        let result = migrate(&tx).and_then(|()| {
            tx.execute(
                "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
                params![version, name],
            )
            .map_err(|e| to_storage_err(e.to_string()))
            .map(|_| ())
        });

        match result {
            Ok(()) => {
                tx.commit().map_err(|e| StorageError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
                tracing::info!(version, name, "applied migration");
                applied = version;
            }
            Err(e) => {
                let _ = tx.rollback();
                return Err(StorageError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                }
                .into());
            }
        }
    }

    Ok(applied)
}

/// Highest applied schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> VantageResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
