//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ems_core::NaiveDateTime;
use ems_sim::{RunSummary, SimObserver, TickSummary};
use ems_world::{EventSink, SimEvent, SimulationState};

use crate::row::{OutcomeRow, RunSummaryRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick summaries, per-emergency outcomes and
/// the run summary to any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// Events are not written; pair it with a
/// [`TextEventLog`][crate::TextEventLog] for a line-by-line log.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EventSink for SimOutputObserver<W> {
    fn record(&mut self, _at: NaiveDateTime, _event: &SimEvent) {}
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: &TickSummary, _state: &SimulationState) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(tick));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, summary: &RunSummary, state: &SimulationState) {
        let mut outcomes: Vec<OutcomeRow> = state.tracked_emergencies().map(OutcomeRow::from_emergency).collect();
        outcomes.sort_by_key(|row| row.emergency_id);
        let result = self.writer.write_outcomes(&outcomes);
        self.store_err(result);

        let result = self.writer.write_run_summary(&RunSummaryRow::from(summary));
        self.store_err(result);

        let result = self.writer.finish();
        self.store_err(result);
    }
}
