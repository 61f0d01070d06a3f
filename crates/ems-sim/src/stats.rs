//! Resolution check, wait-time statistics and the run score.

use ems_core::{NaiveDateTime, minutes_between};
use ems_world::{Emergency, SimulationState};

/// Wait-time aggregates over resolved emergencies, in minutes.
///
/// Every field is zero when nothing has been resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitTimeStatistics {
    pub resolved_count:         usize,
    /// Mean of hospital arrival − call time.
    pub avg_total_wait_min:     f64,
    pub median_total_wait_min:  f64,
    pub min_total_wait_min:     f64,
    pub max_total_wait_min:     f64,
    /// Mean of ambulance arrival − call time.
    pub avg_ambulance_wait_min: f64,
}

/// `true` iff no call is still pending and every tracked call is resolved.
#[inline]
pub fn all_emergencies_resolved(state: &SimulationState) -> bool {
    state.all_emergencies_resolved()
}

pub fn compute_wait_time_statistics(state: &SimulationState) -> WaitTimeStatistics {
    let mut total = Vec::new();
    let mut ambulance = Vec::new();

    for em in state.tracked_emergencies().filter(|e| e.resolved()) {
        if let Some(done) = em.hospital_arrival_time() {
            total.push(minutes_between(em.timestamp(), done));
        }
        if let Some(on_scene) = em.ambulance_arrival_time() {
            ambulance.push(minutes_between(em.timestamp(), on_scene));
        }
    }

    if total.is_empty() {
        return WaitTimeStatistics::default();
    }
    total.sort_by(f64::total_cmp);

    WaitTimeStatistics {
        resolved_count:         total.len(),
        avg_total_wait_min:     mean(&total),
        median_total_wait_min:  median_of_sorted(&total),
        min_total_wait_min:     total[0],
        max_total_wait_min:     total[total.len() - 1],
        avg_ambulance_wait_min: mean(&ambulance),
    }
}

/// Mean wait over every activated call; lower is better.
///
/// Resolved calls count their full wait, unresolved ones the time elapsed
/// so far.  Calls that never activated are left out.  Zero when nothing was
/// activated.
pub fn compute_score(state: &SimulationState) -> f64 {
    let now = state.now();
    let waits: Vec<f64> = state.tracked_emergencies().map(|e| wait_so_far(e, now)).collect();
    mean(&waits)
}

fn wait_so_far(em: &Emergency, now: NaiveDateTime) -> f64 {
    minutes_between(em.timestamp(), em.hospital_arrival_time().unwrap_or(now))
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn median_of_sorted(xs: &[f64]) -> f64 {
    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Final record of a run, handed to [`SimObserver::on_sim_end`][crate::SimObserver::on_sim_end].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Name reported by the policy.
    pub policy:            String,
    pub ticks:             u64,
    pub started_at:        NaiveDateTime,
    pub ended_at:          NaiveDateTime,
    pub all_resolved:      bool,
    /// The run stopped at `max_ticks` with calls still open.
    pub hit_tick_cap:      bool,
    pub applied_decisions: usize,
    pub ignored_decisions: usize,
    pub stats:             WaitTimeStatistics,
    pub score:             f64,
}
