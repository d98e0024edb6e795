//! Insert, get, list, status transitions, and counters for experiments.

use rusqlite::{params, Connection, Row};

use vantage_core::errors::VantageResult;
use vantage_core::models::{
    AssignmentStrategy, ConfidenceLevel, Experiment, ExperimentEvent, ExperimentStatus,
    MatchType, StatusTransition, UrlTarget, Variant, VariantCounts,
};

use super::{bad_value, col, event_ops, parse_opt_ts, parse_ts, with_transaction};
use crate::to_storage_err;

const EXPERIMENT_COLUMNS: &str = "id, name, description, target_pattern, match_type, status,
    strategy, split_a, confidence_level, visits_a, conversions_a, visits_b, conversions_b,
    winner, created_at, updated_at, started_at, ended_at";

/// Insert a new experiment together with its `created` audit event.
pub fn insert_experiment(
    conn: &Connection,
    experiment: &Experiment,
    event: &ExperimentEvent,
) -> VantageResult<()> {
    with_transaction(conn, "insert_experiment", |conn| {
        conn.execute(
            "INSERT INTO experiments (
                id, name, description, target_pattern, match_type, status, strategy, split_a,
                confidence_level, visits_a, conversions_a, visits_b, conversions_b, winner,
                created_at, updated_at, started_at, ended_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
            )",
            params![
                experiment.id,
                experiment.name,
                experiment.description,
                experiment.target.pattern,
                experiment.target.match_type.as_str(),
                experiment.status.as_str(),
                experiment.strategy.as_str(),
                experiment.strategy.percent_a(),
                experiment.confidence_level.percent(),
                experiment.counts.a.visits as i64,
                experiment.counts.a.conversions as i64,
                experiment.counts.b.visits as i64,
                experiment.counts.b.conversions as i64,
                experiment.winner.map(Variant::as_str),
                experiment.created_at.to_rfc3339(),
                experiment.updated_at.to_rfc3339(),
                experiment.started_at.map(|t| t.to_rfc3339()),
                experiment.ended_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

        event_ops::insert_event(conn, event)?;
        Ok(())
    })
}

/// Get a single experiment by ID.
pub fn get_experiment(conn: &Connection, id: &str) -> VantageResult<Option<Experiment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE id = ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    match rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        Some(row) => Ok(Some(row_to_experiment(row)?)),
        None => Ok(None),
    }
}

/// List experiments, optionally filtered by status, oldest first.
pub fn list_experiments(
    conn: &Connection,
    status: Option<ExperimentStatus>,
) -> VantageResult<Vec<Experiment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiments
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY created_at ASC, id ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![status.map(ExperimentStatus::as_str)])
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut experiments = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        experiments.push(row_to_experiment(row)?);
    }
    Ok(experiments)
}

/// Compare-and-set the status and append the transition's audit event.
/// Returns false, without writing anything, when the status was not `from`.
pub fn apply_transition(conn: &Connection, transition: &StatusTransition) -> VantageResult<bool> {
    with_transaction(conn, "apply_transition", |conn| {
        let at = transition.at.to_rfc3339();
        let changed = conn
            .execute(
                "UPDATE experiments SET
                    status = ?1,
                    updated_at = ?2,
                    started_at = CASE WHEN ?1 = 'active' AND started_at IS NULL
                                      THEN ?2 ELSE started_at END,
                    ended_at = CASE WHEN ?1 = 'completed' THEN ?2 ELSE ended_at END,
                    winner = CASE WHEN ?1 = 'completed' THEN COALESCE(?3, winner)
                                  ELSE winner END
                 WHERE id = ?4 AND status = ?5",
                params![
                    transition.to.as_str(),
                    at,
                    transition.winner.map(Variant::as_str),
                    transition.experiment_id,
                    transition.from.as_str(),
                ],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        if changed == 0 {
            return Ok(false);
        }
        event_ops::insert_event(conn, &transition.event)?;
        Ok(true)
    })
}

/// Attach a winner to a Completed experiment that has none.
pub fn set_winner(
    conn: &Connection,
    experiment_id: &str,
    winner: Variant,
    event: &ExperimentEvent,
) -> VantageResult<bool> {
    with_transaction(conn, "set_winner", |conn| {
        let changed = conn
            .execute(
                "UPDATE experiments SET winner = ?1, updated_at = ?2
                 WHERE id = ?3 AND status = 'completed' AND winner IS NULL",
                params![winner.as_str(), event.timestamp.to_rfc3339(), experiment_id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

        if changed == 0 {
            return Ok(false);
        }
        event_ops::insert_event(conn, event)?;
        Ok(true)
    })
}

/// Current counters for an experiment.
pub fn get_counts(conn: &Connection, experiment_id: &str) -> VantageResult<Option<VariantCounts>> {
    let mut stmt = conn
        .prepare(
            "SELECT visits_a, conversions_a, visits_b, conversions_b
             FROM experiments WHERE id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![experiment_id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    match rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        Some(row) => Ok(Some(VariantCounts::new(
            col::<i64>(row, 0)? as u64,
            col::<i64>(row, 1)? as u64,
            col::<i64>(row, 2)? as u64,
            col::<i64>(row, 3)? as u64,
        ))),
        None => Ok(None),
    }
}

/// Current status for an experiment.
pub fn get_status(conn: &Connection, experiment_id: &str) -> VantageResult<Option<ExperimentStatus>> {
    let mut stmt = conn
        .prepare("SELECT status FROM experiments WHERE id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![experiment_id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    match rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        Some(row) => {
            let raw: String = col(row, 0)?;
            ExperimentStatus::parse(&raw)
                .map(Some)
                .ok_or_else(|| bad_value("status", &raw))
        }
        None => Ok(None),
    }
}

fn row_to_experiment(row: &Row<'_>) -> VantageResult<Experiment> {
    let match_type_raw: String = col(row, 4)?;
    let status_raw: String = col(row, 5)?;
    let strategy_raw: String = col(row, 6)?;
    let split_a: Option<u8> = col(row, 7)?;
    let confidence_raw: u8 = col(row, 8)?;
    let winner_raw: Option<String> = col(row, 13)?;
    let created_at: String = col(row, 14)?;
    let updated_at: String = col(row, 15)?;

    let winner = match winner_raw {
        Some(w) => Some(Variant::parse(&w).ok_or_else(|| bad_value("winner", &w))?),
        None => None,
    };

    Ok(Experiment {
        id: col(row, 0)?,
        name: col(row, 1)?,
        description: col(row, 2)?,
        target: UrlTarget {
            pattern: col(row, 3)?,
            match_type: MatchType::parse(&match_type_raw)
                .ok_or_else(|| bad_value("match_type", &match_type_raw))?,
        },
        status: ExperimentStatus::parse(&status_raw)
            .ok_or_else(|| bad_value("status", &status_raw))?,
        strategy: AssignmentStrategy::from_parts(&strategy_raw, split_a)?,
        confidence_level: ConfidenceLevel::try_from(confidence_raw)
            .map_err(|_| bad_value("confidence_level", &confidence_raw.to_string()))?,
        counts: VariantCounts::new(
            col::<i64>(row, 9)? as u64,
            col::<i64>(row, 10)? as u64,
            col::<i64>(row, 11)? as u64,
            col::<i64>(row, 12)? as u64,
        ),
        winner,
        created_at: parse_ts("created_at", &created_at)?,
        updated_at: parse_ts("updated_at", &updated_at)?,
        started_at: parse_opt_ts("started_at", col(row, 16)?)?,
        ended_at: parse_opt_ts("ended_at", col(row, 17)?)?,
    })
}
