//! Read-only view handed to a policy once per tick.

use ems_core::{AmbulanceId, Decision, GeoPoint, NaiveDateTime};
use ems_route::Router;
use ems_world::SimulationState;

/// A read-only snapshot of the simulation passed to
/// [`DispatchPolicy::decide`][crate::DispatchPolicy::decide].
///
/// Built by the tick driver after clock advancement and dropped before any
/// decision is applied, so a policy always sees the state the validator will
/// check its decisions against.
pub struct PolicyContext<'a> {
    /// Current simulation time.
    pub now: NaiveDateTime,

    /// Every entity, including archived emergencies.
    pub state: &'a SimulationState,

    /// The same travel-time estimator the validator routes with.
    pub router: &'a dyn Router,
}

impl<'a> PolicyContext<'a> {
    #[inline]
    pub fn new(state: &'a SimulationState, router: &'a dyn Router) -> Self {
        Self { now: state.now(), state, router }
    }

    /// Estimated minutes from `from` to `to`; `f64::INFINITY` if unreachable.
    #[inline]
    pub fn travel_minutes(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        self.router.travel_minutes(from, to)
    }
}

/// Collects decisions and remembers which ambulances a batch has already
/// committed, so one ambulance is never promised to two calls.
#[derive(Default)]
pub struct DecisionBatch {
    decisions: Vec<Decision>,
    claimed:   Vec<AmbulanceId>,
}

impl DecisionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if an earlier decision in this batch already uses `ambulance`.
    pub fn is_claimed(&self, ambulance: AmbulanceId) -> bool {
        self.claimed.contains(&ambulance)
    }

    pub fn push(&mut self, decision: Decision) {
        self.claimed.push(decision.ambulance());
        self.decisions.push(decision);
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn into_decisions(self) -> Vec<Decision> {
        self.decisions
    }
}
