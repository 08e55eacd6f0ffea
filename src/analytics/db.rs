// Plan history: one row per generated plan.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs;
use std::path::Path;
use crate::error::RepositoryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: i64,
    pub ts: String,
    pub targets_json: String,
    pub constraints_json: String,
    pub total_units: f64,
    pub term_count: i64,
    pub unscheduled_count: i64,
    pub duration_ms: i64,
}

/// Open the history database, creating the file and table when missing.
pub fn init_db(path: &Path) -> Result<Connection, RepositoryError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    Ok(conn)
}

pub fn create_tables(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ts TEXT NOT NULL,
            targets_json TEXT NOT NULL,
            constraints_json TEXT NOT NULL,
            total_units REAL NOT NULL,
            term_count INTEGER NOT NULL,
            unscheduled_count INTEGER NOT NULL,
            duration_ms INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub struct PlanLogEntry<'a> {
    pub targets_json: &'a str,
    pub constraints_json: &'a str,
    pub total_units: f64,
    pub term_count: usize,
    pub unscheduled_count: usize,
    pub duration_ms: i64,
}

/// Insert a history row stamped with the current UTC time (RFC 3339).
pub fn log_plan(conn: &Connection, entry: &PlanLogEntry<'_>) -> Result<i64, RepositoryError> {
    let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.execute(
        "INSERT INTO plans (ts, targets_json, constraints_json, total_units, term_count, unscheduled_count, duration_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ts,
            entry.targets_json,
            entry.constraints_json,
            entry.total_units,
            entry.term_count as i64,
            entry.unscheduled_count as i64,
            entry.duration_ms
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Latest `limit` rows, newest first.
pub fn recent_plans(conn: &Connection, limit: i64) -> Result<Vec<PlanRecord>, RepositoryError> {
    let mut stmt = conn.prepare(
        "SELECT id, ts, targets_json, constraints_json, total_units, term_count, unscheduled_count, duration_ms
         FROM plans ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(PlanRecord {
            id: row.get(0)?,
            ts: row.get(1)?,
            targets_json: row.get(2)?,
            constraints_json: row.get(3)?,
            total_units: row.get(4)?,
            term_count: row.get(5)?,
            unscheduled_count: row.get(6)?,
            duration_ms: row.get(7)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_fetch_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let conn = init_db(&dir.path().join("nested").join("history.db")).unwrap();
        for units in [10.0, 20.0, 30.0] {
            log_plan(
                &conn,
                &PlanLogEntry {
                    targets_json: "[]",
                    constraints_json: "{}",
                    total_units: units,
                    term_count: 2,
                    unscheduled_count: 0,
                    duration_ms: 3,
                },
            )
            .unwrap();
        }
        let rows = recent_plans(&conn, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total_units, 30.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&rows[0].ts).is_ok());
    }
}
