//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tick_summaries.csv`, one row per tick
//! - `outcomes.csv`, one row per activated emergency
//! - `run_summary.csv`, a single row

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutcomeRow, OutputResult, RunSummaryRow, TickSummaryRow};

pub const TICK_SUMMARY_HEADER: [&str; 9] =
    ["tick", "time", "activated", "applied", "ignored", "arrivals", "working", "archived", "pending"];

pub const OUTCOME_HEADER: [&str; 7] = [
    "emergency_id",
    "called_at",
    "status",
    "ambulance_arrival",
    "hospital_arrival",
    "ambulance_wait_min",
    "total_wait_min",
];

pub const RUN_SUMMARY_HEADER: [&str; 14] = [
    "policy",
    "ticks",
    "started_at",
    "ended_at",
    "all_resolved",
    "resolved_count",
    "avg_total_wait_min",
    "median_total_wait_min",
    "min_total_wait_min",
    "max_total_wait_min",
    "avg_ambulance_wait_min",
    "applied_decisions",
    "ignored_decisions",
    "score",
];

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    outcomes:  Writer<File>,
    run:       Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_SUMMARY_HEADER)?;

        let mut outcomes = Writer::from_path(dir.join("outcomes.csv"))?;
        outcomes.write_record(OUTCOME_HEADER)?;

        let mut run = Writer::from_path(dir.join("run_summary.csv"))?;
        run.write_record(RUN_SUMMARY_HEADER)?;

        Ok(Self { summaries, outcomes, run, finished: false })
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time.clone(),
            row.activated.to_string(),
            row.applied.to_string(),
            row.ignored.to_string(),
            row.arrivals.to_string(),
            row.working.to_string(),
            row.archived.to_string(),
            row.pending.to_string(),
        ])?;
        Ok(())
    }

    fn write_outcomes(&mut self, rows: &[OutcomeRow]) -> OutputResult<()> {
        for row in rows {
            self.outcomes.write_record(&[
                row.emergency_id.to_string(),
                row.called_at.clone(),
                row.status.to_owned(),
                opt(&row.ambulance_arrival),
                opt(&row.hospital_arrival),
                opt(&row.ambulance_wait_min),
                opt(&row.total_wait_min),
            ])?;
        }
        Ok(())
    }

    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.run.write_record(&[
            row.policy.clone(),
            row.ticks.to_string(),
            row.started_at.clone(),
            row.ended_at.clone(),
            (row.all_resolved as u8).to_string(),
            row.resolved_count.to_string(),
            row.avg_total_wait_min.to_string(),
            row.median_total_wait_min.to_string(),
            row.min_total_wait_min.to_string(),
            row.max_total_wait_min.to_string(),
            row.avg_ambulance_wait_min.to_string(),
            row.applied_decisions.to_string(),
            row.ignored_decisions.to_string(),
            row.score.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.outcomes.flush()?;
        self.run.flush()?;
        Ok(())
    }
}
