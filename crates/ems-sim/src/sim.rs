//! The `Sim` struct and its tick loop.

use ems_core::SimConfig;
use ems_dispatch::apply_decisions;
use ems_motion::move_ambulances_forward;
use ems_policy::{DispatchPolicy, PolicyContext};
use ems_route::Router;
use ems_world::{SimEvent, SimulationState};

use crate::{
    RunSummary, SimObserver, SimResult, TickSummary, compute_score, compute_wait_time_statistics,
};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<P, R>` owns the world state and drives the tick loop:
///
/// 1. **Clock**: advance by `tick_minutes`; pending calls whose timestamp
///    has been reached become active.
/// 2. **Decide**: call [`DispatchPolicy::decide`] once on a read-only
///    snapshot.
/// 3. **Apply** (sequential, in the order the policy returned them):
///    validate each decision, apply the legal ones, log the rest as ignored.
/// 4. **Motion**: advance every route by one tick and fire arrivals
///    (route advancement is parallel with the `parallel` feature).
/// 5. **Resolution**: the run ends once every call is resolved, or at
///    `max_ticks`.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: DispatchPolicy, R: Router> {
    /// Global configuration (tick length, tick cap, seed, speed).
    pub config: SimConfig,

    /// The world.  Policies only ever see it through a `PolicyContext`.
    pub state: SimulationState,

    /// The decision policy.  Called once per tick.
    pub policy: P,

    /// Travel-time estimator shared by the policy and the validator.
    pub router: R,

    applied: usize,
    ignored: usize,
}

impl<P: DispatchPolicy, R: Router> Sim<P, R> {
    pub(crate) fn new(config: SimConfig, state: SimulationState, policy: P, router: R) -> Self {
        Self { config, state, policy, router, applied: 0, ignored: 0 }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until every emergency is resolved or `config.max_ticks` ticks
    /// have elapsed, whichever comes first.
    ///
    /// Calls observer hooks at every tick boundary and returns the final
    /// summary, which is also passed to
    /// [`on_sim_end`][SimObserver::on_sim_end].  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        tracing::info!(
            policy      = self.policy.name(),
            ambulances  = self.state.ambulances().len(),
            hospitals   = self.state.hospitals().len(),
            emergencies = self.state.emergency_count(),
            start       = %self.state.now(),
            max_ticks   = self.config.max_ticks,
            "simulation started"
        );

        while !self.is_finished() {
            if self.ticks() >= self.config.max_ticks {
                tracing::warn!(
                    max_ticks = self.config.max_ticks,
                    open      = self.state.working_ids().len(),
                    pending   = self.state.pending_count(),
                    "tick cap reached with emergencies unresolved"
                );
                break;
            }
            self.step(observer)?;
        }

        let summary = self.summary();
        observer.on_sim_end(&summary, &self.state);
        tracing::info!(
            ticks    = summary.ticks,
            resolved = summary.stats.resolved_count,
            score    = summary.score,
            "simulation finished"
        );
        Ok(summary)
    }

    /// Run exactly `n` ticks from the current position, ignoring both the
    /// tick cap and the resolution check.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        observer.on_tick_start(self.state.clock());

        // ── Clock ─────────────────────────────────────────────────────────
        //
        // Calls due at the current time are picked up first so that a call
        // stamped exactly at the start of the run is not skipped.
        let mut activated = self.state.activate_due();
        activated.extend(self.state.advance_clock(self.config.tick_minutes));
        let now = self.state.now();
        for &emergency in &activated {
            if let Some(call) = self.state.emergency(emergency) {
                observer.record(now, &SimEvent::EmergencyActivated { emergency, location: call.location() });
            }
        }

        // ── Decide ────────────────────────────────────────────────────────
        let decisions = {
            let ctx = PolicyContext::new(&self.state, &self.router);
            self.policy.decide(&ctx)
        };

        // ── Apply ─────────────────────────────────────────────────────────
        let report = apply_decisions(decisions, &mut self.state, &self.router, &mut *observer)?;
        self.applied += report.applied.len();
        self.ignored += report.ignored.len();

        // ── Motion ────────────────────────────────────────────────────────
        let arrivals = move_ambulances_forward(
            &mut self.state,
            self.config.tick_minutes_f64(),
            &mut *observer,
        )?;

        let tick = TickSummary {
            tick:      self.state.clock().current_tick,
            at:        now,
            activated: activated.len(),
            applied:   report.applied.len(),
            ignored:   report.ignored.len(),
            arrivals:  arrivals.len(),
            working:   self.state.working_ids().len(),
            archived:  self.state.archived_ids().len(),
            pending:   self.state.pending_count(),
        };
        observer.on_tick_end(&tick, &self.state);
        Ok(tick)
    }

    /// `true` once every emergency, pending ones included, is resolved.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.all_emergencies_resolved()
    }

    /// Ticks processed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.state.clock().current_tick.0
    }

    /// Statistics and score for the run so far.
    pub fn summary(&self) -> RunSummary {
        let all_resolved = self.is_finished();
        RunSummary {
            policy:            self.policy.name().to_owned(),
            ticks:             self.ticks(),
            started_at:        self.state.clock().start,
            ended_at:          self.state.now(),
            all_resolved,
            hit_tick_cap:      !all_resolved && self.ticks() >= self.config.max_ticks,
            applied_decisions: self.applied,
            ignored_decisions: self.ignored,
            stats:             compute_wait_time_statistics(&self.state),
            score:             compute_score(&self.state),
        }
    }
}
