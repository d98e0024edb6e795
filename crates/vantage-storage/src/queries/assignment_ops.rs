//! Assignment rows and the counters they drive.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use vantage_core::errors::{VantageError, VantageResult};
use vantage_core::models::{Assignment, Variant};
use vantage_core::traits::ConversionWrite;

use super::{bad_value, col, experiment_crud, parse_opt_ts, parse_ts, with_transaction};
use crate::to_storage_err;

const ASSIGNMENT_COLUMNS: &str =
    "experiment_id, visitor_id, variant, assigned_at, converted, converted_at";

fn visit_increment_sql(variant: Variant) -> &'static str {
    match variant {
        Variant::A => {
            "UPDATE experiments SET visits_a = visits_a + 1, updated_at = ?1
             WHERE id = ?2 AND status = 'active'"
        }
        Variant::B => {
            "UPDATE experiments SET visits_b = visits_b + 1, updated_at = ?1
             WHERE id = ?2 AND status = 'active'"
        }
    }
}

fn conversion_increment_sql(variant: Variant) -> &'static str {
    match variant {
        Variant::A => {
            "UPDATE experiments SET conversions_a = conversions_a + 1, updated_at = ?1
             WHERE id = ?2 AND status IN ('active', 'paused')"
        }
        Variant::B => {
            "UPDATE experiments SET conversions_b = conversions_b + 1, updated_at = ?1
             WHERE id = ?2 AND status IN ('active', 'paused')"
        }
    }
}

/// Get the assignment for a visitor, if any.
pub fn get_assignment(
    conn: &Connection,
    experiment_id: &str,
    visitor_id: &str,
) -> VantageResult<Option<Assignment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM experiment_assignments
             WHERE experiment_id = ?1 AND visitor_id = ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![experiment_id, visitor_id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    match rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        Some(row) => Ok(Some(row_to_assignment(row)?)),
        None => Ok(None),
    }
}

/// Total assignments made so far for an experiment.
pub fn count_assignments(conn: &Connection, experiment_id: &str) -> VantageResult<u64> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM experiment_assignments WHERE experiment_id = ?1",
            params![experiment_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as u64)
}

/// Insert an assignment and count its visit, all-or-nothing.
///
/// A duplicate (experiment, visitor) pair yields `ConflictRetryable`; an
/// experiment that is missing or not Active leaves nothing behind.
pub fn insert_assignment(conn: &Connection, assignment: &Assignment) -> VantageResult<()> {
    with_transaction(conn, "insert_assignment", |conn| {
        match experiment_crud::get_status(conn, &assignment.experiment_id)? {
            None => {
                return Err(VantageError::ExperimentNotFound {
                    id: assignment.experiment_id.clone(),
                })
            }
            Some(status) if !status.accepts_assignments() => {
                return Err(VantageError::invalid_state(
                    &assignment.experiment_id,
                    status,
                    "assign",
                ))
            }
            Some(_) => {}
        }

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO experiment_assignments (
                    experiment_id, visitor_id, variant, assigned_at, converted, converted_at
                ) VALUES (?1, ?2, ?3, ?4, 0, NULL)",
                params![
                    assignment.experiment_id,
                    assignment.visitor_id,
                    assignment.variant.as_str(),
                    assignment.assigned_at.to_rfc3339(),
                ],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        if inserted == 0 {
            return Err(VantageError::ConflictRetryable {
                experiment_id: assignment.experiment_id.clone(),
                visitor_id: assignment.visitor_id.clone(),
            });
        }

        let counted = conn
            .execute(
                visit_increment_sql(assignment.variant),
                params![assignment.assigned_at.to_rfc3339(), assignment.experiment_id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        if counted == 0 {
            return Err(not_accepting(conn, &assignment.experiment_id, "assign")?);
        }
        Ok(())
    })
}

/// Flip the converted flag once and count the conversion in the same transaction.
pub fn mark_converted(
    conn: &Connection,
    experiment_id: &str,
    visitor_id: &str,
    at: DateTime<Utc>,
) -> VantageResult<ConversionWrite> {
    with_transaction(conn, "mark_converted", |conn| {
        let flipped = conn
            .execute(
                "UPDATE experiment_assignments SET converted = 1, converted_at = ?1
                 WHERE experiment_id = ?2 AND visitor_id = ?3 AND converted = 0",
                params![at.to_rfc3339(), experiment_id, visitor_id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        let Some(assignment) = get_assignment(conn, experiment_id, visitor_id)? else {
            return Ok(ConversionWrite::NoAssignment);
        };

        if flipped == 0 {
            return Ok(ConversionWrite::AlreadyConverted(assignment.variant));
        }

        let counted = conn
            .execute(
                conversion_increment_sql(assignment.variant),
                params![at.to_rfc3339(), experiment_id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        if counted == 0 {
            return Err(not_accepting(conn, experiment_id, "record a conversion for")?);
        }
        Ok(ConversionWrite::Recorded(assignment.variant))
    })
}

/// Explain why a guarded counter update touched no row.
fn not_accepting(
    conn: &Connection,
    experiment_id: &str,
    operation: &str,
) -> VantageResult<VantageError> {
    Ok(match experiment_crud::get_status(conn, experiment_id)? {
        Some(status) => VantageError::invalid_state(experiment_id, status, operation),
        None => VantageError::ExperimentNotFound {
            id: experiment_id.to_string(),
        },
    })
}

fn row_to_assignment(row: &Row<'_>) -> VantageResult<Assignment> {
    let variant_raw: String = col(row, 2)?;
    let assigned_at: String = col(row, 3)?;
    let converted: i64 = col(row, 4)?;

    Ok(Assignment {
        experiment_id: col(row, 0)?,
        visitor_id: col(row, 1)?,
        variant: Variant::parse(&variant_raw).ok_or_else(|| bad_value("variant", &variant_raw))?,
        assigned_at: parse_ts("assigned_at", &assigned_at)?,
        converted: converted != 0,
        converted_at: parse_opt_ts("converted_at", col(row, 5)?)?,
    })
}
