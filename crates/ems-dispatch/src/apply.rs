//! Decision validation and application.

use ems_core::{AmbulanceId, Decision, EmergencyId, GeoPoint, HospitalId};
use ems_route::{RouteCursor, Router};
use ems_world::{
    Ambulance, AmbulanceStatus, Emergency, EmergencyStatus, EventSink, IgnoreReason, SimEvent,
    SimulationState,
};

use crate::{DispatchError, DispatchResult};

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What happened to one decision.
#[derive(Clone, Debug, PartialEq)]
pub enum DecisionOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl DecisionOutcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, DecisionOutcome::Applied)
    }
}

/// Per-batch summary returned by [`apply_decisions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyReport {
    /// Applied decisions, in input order.
    pub applied: Vec<Decision>,
    /// Ignored decisions with their reasons, in input order.
    pub ignored: Vec<(Decision, IgnoreReason)>,
}

impl ApplyReport {
    /// Total number of decisions processed.
    pub fn len(&self) -> usize {
        self.applied.len() + self.ignored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.ignored.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Validate and apply `decisions` in order.
///
/// Every decision yields exactly one outcome, written to `sink` at the
/// current clock and mirrored to `tracing` at debug level.  Illegal
/// decisions never fail the batch; only an invariant violation does.
pub fn apply_decisions<I>(
    decisions: I,
    state:     &mut SimulationState,
    router:    &dyn Router,
    sink:      &mut dyn EventSink,
) -> DispatchResult<ApplyReport>
where
    I: IntoIterator<Item = Decision>,
{
    let mut report = ApplyReport::default();
    let now = state.now();

    for decision in decisions {
        match apply_decision(decision, state, router)? {
            DecisionOutcome::Applied => {
                tracing::debug!(%decision, "decision applied");
                sink.record(now, &SimEvent::DecisionApplied(decision));
                report.applied.push(decision);
            }
            DecisionOutcome::Ignored(reason) => {
                tracing::debug!(%decision, %reason, "decision ignored");
                sink.record(now, &SimEvent::DecisionIgnored { decision, reason: reason.clone() });
                report.ignored.push((decision, reason));
            }
        }
    }

    Ok(report)
}

/// Validate and, if legal, apply a single decision.
pub fn apply_decision(
    decision: Decision,
    state:    &mut SimulationState,
    router:   &dyn Router,
) -> DispatchResult<DecisionOutcome> {
    let checked = match decision {
        Decision::SendAmbulanceToEmergency { ambulance, emergency } => {
            check_send_to_emergency(state, router, ambulance, emergency)
        }
        Decision::SendAmbulanceToHospital { ambulance, hospital } => {
            check_send_to_hospital(state, router, ambulance, hospital)
        }
        Decision::ChangeTargetHospital { ambulance, hospital } => {
            check_change_target(state, router, ambulance, hospital)
        }
        Decision::RelocateAmbulance { ambulance, target } => {
            check_relocate(state, router, ambulance, target)
        }
    };

    match checked {
        Ok(cursor) => {
            commit(decision, cursor, state)?;
            Ok(DecisionOutcome::Applied)
        }
        Err(reason) => Ok(DecisionOutcome::Ignored(reason)),
    }
}

// ── Validation ────────────────────────────────────────────────────────────────
//
// Each check returns the route the ambulance will follow, so a passing
// decision needs no further lookups that could fail.

type Checked = Result<RouteCursor, IgnoreReason>;

fn check_send_to_emergency(
    state:     &SimulationState,
    router:    &dyn Router,
    ambulance: AmbulanceId,
    emergency: EmergencyId,
) -> Checked {
    let amb = find_ambulance(state, ambulance)?;
    let call = state
        .emergency(emergency)
        .filter(|_| state.is_working(emergency))
        .ok_or(IgnoreReason::UnknownEmergency(emergency))?;

    if !amb.is_available() {
        return Err(not_eligible(amb, "idle or relocating with no emergency"));
    }
    if call.status() != EmergencyStatus::WaitingForAssignment {
        return Err(IgnoreReason::EmergencyNotEligible { emergency, status: call.status() });
    }
    route_to(router, amb, call.location())
}

fn check_send_to_hospital(
    state:     &SimulationState,
    router:    &dyn Router,
    ambulance: AmbulanceId,
    hospital:  HospitalId,
) -> Checked {
    let amb = find_ambulance(state, ambulance)?;
    let dest = state.hospital(hospital).ok_or(IgnoreReason::UnknownHospital(hospital))?;

    let carrying = amb.emergency_assigned().is_some() && amb.contains_patient();
    if !carrying || amb.hospital_assigned().is_some() {
        return Err(not_eligible(amb, "carrying a patient with no hospital assigned"));
    }
    route_to(router, amb, dest.location())
}

fn check_change_target(
    state:     &SimulationState,
    router:    &dyn Router,
    ambulance: AmbulanceId,
    hospital:  HospitalId,
) -> Checked {
    let amb = find_ambulance(state, ambulance)?;
    let dest = state.hospital(hospital).ok_or(IgnoreReason::UnknownHospital(hospital))?;

    if amb.status() != AmbulanceStatus::EnRouteToHospital {
        return Err(not_eligible(amb, "en_route_to_hospital"));
    }
    route_to(router, amb, dest.location())
}

fn check_relocate(
    state:     &SimulationState,
    router:    &dyn Router,
    ambulance: AmbulanceId,
    target:    GeoPoint,
) -> Checked {
    let amb = find_ambulance(state, ambulance)?;

    if amb.status() != AmbulanceStatus::Idle || amb.emergency_assigned().is_some() {
        return Err(not_eligible(amb, "idle with no emergency"));
    }
    route_to(router, amb, target)
}

fn find_ambulance(state: &SimulationState, id: AmbulanceId) -> Result<&Ambulance, IgnoreReason> {
    state.ambulance(id).ok_or(IgnoreReason::UnknownAmbulance(id))
}

fn not_eligible(amb: &Ambulance, requires: &'static str) -> IgnoreReason {
    IgnoreReason::AmbulanceNotEligible { ambulance: amb.id(), status: amb.status(), requires }
}

/// Route from the ambulance's current position; empty means unreachable.
fn route_to(router: &dyn Router, amb: &Ambulance, target: GeoPoint) -> Checked {
    let from = amb.position();
    RouteCursor::new(from, router.route(from, target))
        .ok_or(IgnoreReason::Unreachable { ambulance: amb.id(), target })
}

// ── Application ───────────────────────────────────────────────────────────────

fn commit(decision: Decision, cursor: RouteCursor, state: &mut SimulationState) -> DispatchResult<()> {
    let ambulance = decision.ambulance();
    let amb = state
        .ambulance_mut(ambulance)
        .ok_or(DispatchError::DanglingAmbulance(ambulance))?;

    match decision {
        Decision::SendAmbulanceToEmergency { emergency, .. } => {
            amb.dispatch_to_emergency(emergency, cursor)?;
            call_mut(state, ambulance, emergency)?.assign()?;
        }
        Decision::SendAmbulanceToHospital { hospital, .. } => {
            amb.dispatch_to_hospital(hospital, cursor)?;
            // A successful hospital dispatch implies a carried emergency.
            if let Some(emergency) = amb.emergency_assigned() {
                call_mut(state, ambulance, emergency)?.depart_to_hospital()?;
            }
        }
        Decision::ChangeTargetHospital { hospital, .. } => {
            amb.retarget_hospital(hospital, cursor)?;
        }
        Decision::RelocateAmbulance { .. } => {
            amb.relocate(cursor)?;
        }
    }
    Ok(())
}

fn call_mut(
    state:     &mut SimulationState,
    ambulance: AmbulanceId,
    emergency: EmergencyId,
) -> DispatchResult<&mut Emergency> {
    state
        .emergency_mut(emergency)
        .ok_or(DispatchError::DanglingEmergency { ambulance, emergency })
}
