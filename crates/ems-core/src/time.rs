//! Simulation time model.
//!
//! # Design
//!
//! The simulator runs on a wall-clock calendar: emergency calls carry real
//! timestamps (`YYYY-MM-DD-HH-MM-SS`) and the global clock is a
//! [`NaiveDateTime`] that only ever moves forward.  Alongside it `SimClock`
//! keeps an integer `Tick` counter so drivers can cap a run by tick count
//! without floating-point drift.
//!
//! Durations handed to routing and motion are expressed in **minutes** as
//! `f64`; a tick is a whole number of minutes (one in the reference
//! harness).

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use crate::{EmsError, EmsResult};

/// Fixed input format of scenario timestamps, e.g. `2025-01-27-08-15-00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Parse a scenario timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(s: &str) -> EmsResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map_err(|e| EmsError::Timestamp {
        value:  s.to_owned(),
        reason: e.to_string(),
    })
}

/// Render a timestamp back into [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Minutes from `earlier` to `later` (negative if `later` is before `earlier`).
#[inline]
pub fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Number of clock advances since the run started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The global simulation clock.
///
/// Monotonic: [`advance_minutes`][Self::advance_minutes] only moves forward
/// and [`set`][Self::set] refuses to go back in time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Calendar time of tick 0.
    pub start: NaiveDateTime,
    /// Current calendar time.
    pub now: NaiveDateTime,
    /// Number of `advance_minutes` calls so far.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, now: start, current_tick: Tick::ZERO }
    }

    /// Advance by one tick of `minutes` minutes and return the new time.
    #[inline]
    pub fn advance_minutes(&mut self, minutes: u32) -> NaiveDateTime {
        self.now += Duration::minutes(i64::from(minutes));
        self.current_tick = self.current_tick + 1;
        self.now
    }

    /// Jump to `t`, which must not be earlier than the current time.
    ///
    /// The tick counter is left untouched; jumps are how a driver fast-forwards
    /// to the first call of a scenario.
    pub fn set(&mut self, t: NaiveDateTime) -> EmsResult<()> {
        if t < self.now {
            return Err(EmsError::ClockRewind { now: self.now, requested: t });
        }
        self.now = t;
        Ok(())
    }

    /// Re-anchor a clock that has not yet ticked.
    ///
    /// Used when a scenario is loaded into a freshly built state: the run
    /// starts at the first call rather than at an arbitrary placeholder.
    pub fn restart_at(&mut self, start: NaiveDateTime) {
        self.start = start;
        self.now = start;
        self.current_tick = Tick::ZERO;
    }

    /// Minutes elapsed since `start`.
    #[inline]
    pub fn elapsed_minutes(&self) -> f64 {
        minutes_between(self.start, self.now)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.current_tick, self.now.format("%Y-%m-%d %H:%M:%S"))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a JSON file by the harness and passed to the
/// simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Minutes per tick.  The reference harness uses 1.
    pub tick_minutes: u32,

    /// Hard cap on the number of ticks; a run also ends as soon as every
    /// emergency is resolved.
    pub max_ticks: u64,

    /// Seed handed to randomised policies.  The engine itself never draws
    /// random numbers.
    pub seed: u64,

    /// Assumed constant travel speed for the linear fallback router.
    pub speed_kmh: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_minutes: 1,
            max_ticks:    7 * 24 * 60,
            seed:         42,
            speed_kmh:    40.0,
        }
    }
}

impl SimConfig {
    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> EmsResult<()> {
        if self.tick_minutes == 0 {
            return Err(EmsError::Config("tick_minutes must be at least 1".into()));
        }
        if !(self.speed_kmh.is_finite() && self.speed_kmh > 0.0) {
            return Err(EmsError::Config(format!(
                "speed_kmh must be a positive number, got {}",
                self.speed_kmh
            )));
        }
        Ok(())
    }

    /// The tick length as `f64` minutes, the unit used by motion.
    #[inline]
    pub fn tick_minutes_f64(&self) -> f64 {
        f64::from(self.tick_minutes)
    }
}
