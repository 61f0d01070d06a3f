//! Human-readable event log.
//!
//! ```text
//! SIMULATION EVENT LOG
//! [2025-01-27 08:01:00] EmergencyId(101) called from (40.001000, -75.001000)
//! [2025-01-27 08:01:00] APPLIED SendAmbulanceToEmergency(ambulance=1, emergency=101)
//! ...
//! STATISTICS
//! policy: nearest_available
//! ...
//! ```

use std::io::{self, Write};

use ems_core::NaiveDateTime;
use ems_sim::{RunSummary, SimObserver};
use ems_world::{EventSink, SimEvent, SimulationState};

use crate::OutputError;

pub const LOG_HEADER: &str = "SIMULATION EVENT LOG";

/// An [`EventSink`] and [`SimObserver`] writing one line per event to `W`,
/// followed by a statistics block when the run ends.
///
/// Write errors do not interrupt the run; the first one is kept and can be
/// read back with [`take_error`][Self::take_error].  Later lines are dropped
/// once a write has failed.
pub struct TextEventLog<W: Write> {
    out:        W,
    last_error: Option<OutputError>,
}

impl<W: Write> TextEventLog<W> {
    /// Wrap `out` and write the header line.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{LOG_HEADER}")?;
        Ok(Self { out, last_error: None })
    }

    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_summary(&mut self, s: &RunSummary) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "STATISTICS")?;
        writeln!(out, "policy: {}", s.policy)?;
        writeln!(out, "ticks: {}", s.ticks)?;
        writeln!(out, "simulated: {} to {}", s.started_at, s.ended_at)?;
        writeln!(out, "all resolved: {}", s.all_resolved)?;
        writeln!(out, "resolved emergencies: {}", s.stats.resolved_count)?;
        writeln!(out, "average total wait: {:.2} min", s.stats.avg_total_wait_min)?;
        writeln!(out, "median total wait: {:.2} min", s.stats.median_total_wait_min)?;
        writeln!(out, "min total wait: {:.2} min", s.stats.min_total_wait_min)?;
        writeln!(out, "max total wait: {:.2} min", s.stats.max_total_wait_min)?;
        writeln!(out, "average ambulance wait: {:.2} min", s.stats.avg_ambulance_wait_min)?;
        writeln!(out, "decisions applied: {}", s.applied_decisions)?;
        writeln!(out, "decisions ignored: {}", s.ignored_decisions)?;
        writeln!(out, "score: {:.2}", s.score)?;
        out.flush()
    }

    fn keep(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e.into());
            }
        }
    }
}

impl<W: Write> EventSink for TextEventLog<W> {
    fn record(&mut self, at: NaiveDateTime, event: &SimEvent) {
        if self.last_error.is_some() {
            return;
        }
        let result = writeln!(self.out, "[{}] {event}", at.format("%Y-%m-%d %H:%M:%S"));
        self.keep(result);
    }
}

impl<W: Write> SimObserver for TextEventLog<W> {
    fn on_sim_end(&mut self, summary: &RunSummary, _state: &SimulationState) {
        if self.last_error.is_some() {
            return;
        }
        let result = self.write_summary(summary);
        self.keep(result);
    }
}
