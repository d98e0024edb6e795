//! SQL behind `IExperimentStorage`, one module per table.

pub mod assignment_ops;
pub mod event_ops;
pub mod experiment_crud;

use chrono::{DateTime, Utc};
use rusqlite::types::FromSql;
use rusqlite::{Connection, Row};

use vantage_core::errors::{StorageError, VantageError, VantageResult};

use crate::to_storage_err;

/// Read a column, mapping the rusqlite error into the workspace error type.
pub(crate) fn col<T: FromSql>(row: &Row<'_>, idx: usize) -> VantageResult<T> {
    row.get(idx).map_err(|e| to_storage_err(e.to_string()))
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_ts(column: &str, value: &str) -> VantageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| bad_value(column, value))
}

/// Parse an optional RFC 3339 timestamp column.
pub(crate) fn parse_opt_ts(
    column: &str,
    value: Option<String>,
) -> VantageResult<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(column, &v)).transpose()
}

/// Build the error for an enum column holding an unknown tag.
pub(crate) fn bad_value(column: &str, value: &str) -> VantageError {
    StorageError::InvalidColumnValue {
        column: column.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
pub(crate) fn with_transaction<T, F>(conn: &Connection, label: &str, f: F) -> VantageResult<T>
where
    F: FnOnce(&Connection) -> VantageResult<T>,
{
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("{label} begin: {e}")))?;

    match f(&tx) {
        Ok(value) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("{label} commit: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}
