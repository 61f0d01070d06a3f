//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutcomeRow, OutputResult, RunSummaryRow, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// The observer never propagates these errors; the first one is stored and
/// retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the per-emergency outcomes, once at the end of a run.
    fn write_outcomes(&mut self, rows: &[OutcomeRow]) -> OutputResult<()>;

    /// Write the run summary, once at the end of a run.
    fn write_run_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Calling it more than once is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}
