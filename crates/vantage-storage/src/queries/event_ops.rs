//! Append-only experiment audit events.

use rusqlite::{params, Connection, Row};

use vantage_core::errors::VantageResult;
use vantage_core::models::{EventKind, ExperimentEvent, ExperimentStatus, Variant};

use super::{bad_value, col, parse_ts};
use crate::to_storage_err;

/// Append an event. Returns the row id.
pub fn insert_event(conn: &Connection, event: &ExperimentEvent) -> VantageResult<i64> {
    let details = serde_json::to_string(&event.details)?;

    conn.execute(
        "INSERT INTO experiment_events (
            experiment_id, kind, from_status, to_status, winner, actor, details, timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.experiment_id,
            event.kind.as_str(),
            event.from_status.map(ExperimentStatus::as_str),
            event.to_status.map(ExperimentStatus::as_str),
            event.winner.map(Variant::as_str),
            event.actor,
            details,
            event.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// All events for an experiment in insertion order.
pub fn list_events(conn: &Connection, experiment_id: &str) -> VantageResult<Vec<ExperimentEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, experiment_id, kind, from_status, to_status, winner, actor, details, timestamp
             FROM experiment_events WHERE experiment_id = ?1 ORDER BY id ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![experiment_id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut events = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        events.push(row_to_event(row)?);
    }
    Ok(events)
}

fn parse_status(column: &str, raw: Option<String>) -> VantageResult<Option<ExperimentStatus>> {
    match raw {
        Some(s) => ExperimentStatus::parse(&s)
            .map(Some)
            .ok_or_else(|| bad_value(column, &s)),
        None => Ok(None),
    }
}

fn row_to_event(row: &Row<'_>) -> VantageResult<ExperimentEvent> {
    let kind_raw: String = col(row, 2)?;
    let winner_raw: Option<String> = col(row, 5)?;
    let details_raw: String = col(row, 7)?;
    let timestamp: String = col(row, 8)?;

    let winner = match winner_raw {
        Some(w) => Some(Variant::parse(&w).ok_or_else(|| bad_value("winner", &w))?),
        None => None,
    };

    Ok(ExperimentEvent {
        id: col(row, 0)?,
        experiment_id: col(row, 1)?,
        kind: EventKind::parse(&kind_raw).ok_or_else(|| bad_value("kind", &kind_raw))?,
        from_status: parse_status("from_status", col(row, 3)?)?,
        to_status: parse_status("to_status", col(row, 4)?)?,
        winner,
        actor: col(row, 6)?,
        details: serde_json::from_str(&details_raw)?,
        timestamp: parse_ts("timestamp", &timestamp)?,
    })
}
