//! Simulation observer trait for progress reporting and data collection.

use ems_core::{NaiveDateTime, SimClock, Tick};
use ems_world::{EventSink, SimulationState};

use crate::RunSummary;

/// Counters for one completed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:      Tick,
    pub at:        NaiveDateTime,
    /// Calls that became active this tick.
    pub activated: usize,
    pub applied:   usize,
    pub ignored:   usize,
    pub arrivals:  usize,
    /// Calls still open after the motion step.
    pub working:   usize,
    pub archived:  usize,
    pub pending:   usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// Observers are also the run's [`EventSink`]: every activation, decision
/// outcome and arrival is recorded through [`EventSink::record`] as it
/// happens.  The hook methods have default no-op implementations so
/// implementors only need to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl EventSink for ProgressPrinter {
///     fn record(&mut self, _at: NaiveDateTime, _event: &SimEvent) {}
/// }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: &TickSummary, _state: &SimulationState) {
///         if tick.tick.0 % self.interval == 0 {
///             println!("{}: {} calls open", tick.at, tick.working);
///         }
///     }
/// }
/// ```
pub trait SimObserver: EventSink {
    /// Called at the very start of each tick, before the clock moves.
    fn on_tick_start(&mut self, _clock: &SimClock) {}

    /// Called at the end of each tick, after the motion step.
    fn on_tick_end(&mut self, _tick: &TickSummary, _state: &SimulationState) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _summary: &RunSummary, _state: &SimulationState) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks or an event log.
pub struct NoopObserver;

impl EventSink for NoopObserver {
    fn record(&mut self, _at: NaiveDateTime, _event: &ems_world::SimEvent) {}
}

impl SimObserver for NoopObserver {}

/// Drive two observers from one run, `.0` first.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, clock: &SimClock) {
        self.0.on_tick_start(clock);
        self.1.on_tick_start(clock);
    }

    fn on_tick_end(&mut self, tick: &TickSummary, state: &SimulationState) {
        self.0.on_tick_end(tick, state);
        self.1.on_tick_end(tick, state);
    }

    fn on_sim_end(&mut self, summary: &RunSummary, state: &SimulationState) {
        self.0.on_sim_end(summary, state);
        self.1.on_sim_end(summary, state);
    }
}
