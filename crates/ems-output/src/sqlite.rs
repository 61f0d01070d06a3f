//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `tick_summaries`, `outcomes` and `run_summary`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutcomeRow, OutputResult, RunSummaryRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick      INTEGER PRIMARY KEY,
                 time      TEXT    NOT NULL,
                 activated INTEGER NOT NULL,
                 applied   INTEGER NOT NULL,
                 ignored   INTEGER NOT NULL,
                 arrivals  INTEGER NOT NULL,
                 working   INTEGER NOT NULL,
                 archived  INTEGER NOT NULL,
                 pending   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS outcomes (
                 emergency_id       INTEGER PRIMARY KEY,
                 called_at          TEXT    NOT NULL,
                 status             TEXT    NOT NULL,
                 ambulance_arrival  TEXT,
                 hospital_arrival   TEXT,
                 ambulance_wait_min REAL,
                 total_wait_min     REAL
             );
             CREATE TABLE IF NOT EXISTS run_summary (
                 policy                 TEXT    NOT NULL,
                 ticks                  INTEGER NOT NULL,
                 started_at             TEXT    NOT NULL,
                 ended_at               TEXT    NOT NULL,
                 all_resolved           INTEGER NOT NULL,
                 resolved_count         INTEGER NOT NULL,
                 avg_total_wait_min     REAL    NOT NULL,
                 median_total_wait_min  REAL    NOT NULL,
                 min_total_wait_min     REAL    NOT NULL,
                 max_total_wait_min     REAL    NOT NULL,
                 avg_ambulance_wait_min REAL    NOT NULL,
                 applied_decisions      INTEGER NOT NULL,
                 ignored_decisions      INTEGER NOT NULL,
                 score                  REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, time, activated, applied, ignored, arrivals, working, archived, pending) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                row.tick,
                row.time,
                row.activated,
                row.applied,
                row.ignored,
                row.arrivals,
                row.working,
                row.archived,
                row.pending,
            ],
        )?;
        Ok(())
    }

    fn write_outcomes(&mut self, rows: &[OutcomeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO outcomes \
                 (emergency_id, called_at, status, ambulance_arrival, hospital_arrival, \
                  ambulance_wait_min, total_wait_min) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.emergency_id,
                    row.called_at,
                    row.status,
                    row.ambulance_arrival,
                    row.hospital_arrival,
                    row.ambulance_wait_min,
                    row.total_wait_min,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO run_summary \
             (policy, ticks, started_at, ended_at, all_resolved, resolved_count, \
              avg_total_wait_min, median_total_wait_min, min_total_wait_min, max_total_wait_min, \
              avg_ambulance_wait_min, applied_decisions, ignored_decisions, score) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            rusqlite::params![
                row.policy,
                row.ticks,
                row.started_at,
                row.ended_at,
                row.all_resolved,
                row.resolved_count,
                row.avg_total_wait_min,
                row.median_total_wait_min,
                row.min_total_wait_min,
                row.max_total_wait_min,
                row.avg_ambulance_wait_min,
                row.applied_decisions,
                row.ignored_decisions,
                row.score,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
