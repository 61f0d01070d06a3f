//! Plain data row types written by output backends.

use ems_core::{format_timestamp, minutes_between};
use ems_sim::{RunSummary, TickSummary};
use ems_world::Emergency;

/// Final outcome of one emergency.
///
/// Timestamps use the scenario format `YYYY-MM-DD-HH-MM-SS`; the optional
/// fields are empty for calls that never got that far.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRow {
    pub emergency_id:       u32,
    pub called_at:          String,
    pub status:             &'static str,
    pub ambulance_arrival:  Option<String>,
    pub hospital_arrival:   Option<String>,
    pub ambulance_wait_min: Option<f64>,
    pub total_wait_min:     Option<f64>,
}

impl OutcomeRow {
    pub fn from_emergency(em: &Emergency) -> Self {
        let called = em.timestamp();
        Self {
            emergency_id:       em.id().raw(),
            called_at:          format_timestamp(called),
            status:             em.status().as_str(),
            ambulance_arrival:  em.ambulance_arrival_time().map(format_timestamp),
            hospital_arrival:   em.hospital_arrival_time().map(format_timestamp),
            ambulance_wait_min: em.ambulance_arrival_time().map(|t| minutes_between(called, t)),
            total_wait_min:     em.hospital_arrival_time().map(|t| minutes_between(called, t)),
        }
    }
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:      u64,
    pub time:      String,
    pub activated: u64,
    pub applied:   u64,
    pub ignored:   u64,
    pub arrivals:  u64,
    pub working:   u64,
    pub archived:  u64,
    pub pending:   u64,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(t: &TickSummary) -> Self {
        Self {
            tick:      t.tick.0,
            time:      format_timestamp(t.at),
            activated: t.activated as u64,
            applied:   t.applied as u64,
            ignored:   t.ignored as u64,
            arrivals:  t.arrivals as u64,
            working:   t.working as u64,
            archived:  t.archived as u64,
            pending:   t.pending as u64,
        }
    }
}

/// One line per run: statistics and score.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummaryRow {
    pub policy:                 String,
    pub ticks:                  u64,
    pub started_at:             String,
    pub ended_at:               String,
    pub all_resolved:           bool,
    pub resolved_count:         u64,
    pub avg_total_wait_min:     f64,
    pub median_total_wait_min:  f64,
    pub min_total_wait_min:     f64,
    pub max_total_wait_min:     f64,
    pub avg_ambulance_wait_min: f64,
    pub applied_decisions:      u64,
    pub ignored_decisions:      u64,
    pub score:                  f64,
}

impl From<&RunSummary> for RunSummaryRow {
    fn from(s: &RunSummary) -> Self {
        Self {
            policy:                 s.policy.clone(),
            ticks:                  s.ticks,
            started_at:             format_timestamp(s.started_at),
            ended_at:               format_timestamp(s.ended_at),
            all_resolved:           s.all_resolved,
            resolved_count:         s.stats.resolved_count as u64,
            avg_total_wait_min:     s.stats.avg_total_wait_min,
            median_total_wait_min:  s.stats.median_total_wait_min,
            min_total_wait_min:     s.stats.min_total_wait_min,
            max_total_wait_min:     s.stats.max_total_wait_min,
            avg_ambulance_wait_min: s.stats.avg_ambulance_wait_min,
            applied_decisions:      s.applied_decisions as u64,
            ignored_decisions:      s.ignored_decisions as u64,
            score:                  s.score,
        }
    }
}
