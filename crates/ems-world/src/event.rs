//! Engine events and the injected sink they are written to.
//!
//! The validator and the motion step describe everything they do as a
//! [`SimEvent`] and hand it to an [`EventSink`] supplied by the harness.
//! Sinks are infallible from the engine's point of view: a file-backed sink
//! keeps its own I/O error for the harness to inspect after the run.

use std::fmt;

use ems_core::{AmbulanceId, Decision, EmergencyId, GeoPoint, HospitalId, NaiveDateTime};

use crate::entity::{AmbulanceStatus, EmergencyStatus};

// ── IgnoreReason ──────────────────────────────────────────────────────────────

/// Why a decision was ignored.
///
/// The `Unknown*` variants mean the decision referenced an id that does not
/// exist; the `*NotEligible` variants mean the entity exists but its current
/// state forbids the action.
#[derive(Clone, Debug, PartialEq)]
pub enum IgnoreReason {
    UnknownAmbulance(AmbulanceId),
    UnknownEmergency(EmergencyId),
    UnknownHospital(HospitalId),

    AmbulanceNotEligible {
        ambulance: AmbulanceId,
        status:    AmbulanceStatus,
        /// The legality requirement that failed, e.g. `"idle or relocating"`.
        requires:  &'static str,
    },

    EmergencyNotEligible {
        emergency: EmergencyId,
        status:    EmergencyStatus,
    },

    /// The router returned an empty route to the target.
    Unreachable {
        ambulance: AmbulanceId,
        target:    GeoPoint,
    },
}

impl IgnoreReason {
    /// `true` if the decision named an id that does not exist.
    pub fn is_unknown_id(&self) -> bool {
        matches!(
            self,
            IgnoreReason::UnknownAmbulance(_)
                | IgnoreReason::UnknownEmergency(_)
                | IgnoreReason::UnknownHospital(_)
        )
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnknownAmbulance(id) => write!(f, "unknown id: {id}"),
            IgnoreReason::UnknownEmergency(id) => write!(f, "unknown id: {id}"),
            IgnoreReason::UnknownHospital(id) => write!(f, "unknown id: {id}"),
            IgnoreReason::AmbulanceNotEligible { ambulance, status, requires } => {
                write!(f, "ineligible state: {ambulance} is {status}, requires {requires}")
            }
            IgnoreReason::EmergencyNotEligible { emergency, status } => {
                write!(f, "ineligible state: {emergency} is {status}, requires waiting_for_assignment")
            }
            IgnoreReason::Unreachable { ambulance, target } => {
                write!(f, "unreachable: no route for {ambulance} to {target}")
            }
        }
    }
}

// ── SimEvent ──────────────────────────────────────────────────────────────────

/// Something the engine did.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// A call's timestamp elapsed and it entered the working set.
    EmergencyActivated {
        emergency: EmergencyId,
        location:  GeoPoint,
    },

    DecisionApplied(Decision),

    DecisionIgnored {
        decision: Decision,
        reason:   IgnoreReason,
    },

    ArrivedAtEmergency {
        ambulance: AmbulanceId,
        emergency: EmergencyId,
    },

    ArrivedAtHospital {
        ambulance:      AmbulanceId,
        hospital:       HospitalId,
        free_beds_left: u32,
    },

    EmergencyResolved {
        emergency:      EmergencyId,
        /// Minutes from the call to hospital arrival.
        total_wait_min: f64,
    },

    RelocationFinished {
        ambulance: AmbulanceId,
        position:  GeoPoint,
    },
}

impl SimEvent {
    /// Short machine-friendly tag, e.g. `decision_ignored`.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::EmergencyActivated { .. } => "emergency_activated",
            SimEvent::DecisionApplied(_)        => "decision_applied",
            SimEvent::DecisionIgnored { .. }    => "decision_ignored",
            SimEvent::ArrivedAtEmergency { .. } => "arrived_at_emergency",
            SimEvent::ArrivedAtHospital { .. }  => "arrived_at_hospital",
            SimEvent::EmergencyResolved { .. }  => "emergency_resolved",
            SimEvent::RelocationFinished { .. } => "relocation_finished",
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::EmergencyActivated { emergency, location } => {
                write!(f, "{emergency} called from {location}")
            }
            SimEvent::DecisionApplied(d) => write!(f, "APPLIED {d}"),
            SimEvent::DecisionIgnored { decision, reason } => write!(f, "IGNORED {decision}: {reason}"),
            SimEvent::ArrivedAtEmergency { ambulance, emergency } => {
                write!(f, "{ambulance} arrived at {emergency}")
            }
            SimEvent::ArrivedAtHospital { ambulance, hospital, free_beds_left } => {
                write!(f, "{ambulance} arrived at {hospital} ({free_beds_left} beds left)")
            }
            SimEvent::EmergencyResolved { emergency, total_wait_min } => {
                write!(f, "{emergency} resolved after {total_wait_min:.1} min")
            }
            SimEvent::RelocationFinished { ambulance, position } => {
                write!(f, "{ambulance} finished relocating at {position}")
            }
        }
    }
}

// ── EventSink ─────────────────────────────────────────────────────────────────

/// Destination for engine events.
pub trait EventSink {
    /// Record `event`, which happened at simulation time `at`.
    fn record(&mut self, at: NaiveDateTime, event: &SimEvent);
}

/// A sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _at: NaiveDateTime, _event: &SimEvent) {}
}

/// An event together with the time it happened.
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedEvent {
    pub at:    NaiveDateTime,
    pub event: SimEvent,
}

/// In-memory sink, handy for tests and post-run inspection.
impl EventSink for Vec<LoggedEvent> {
    fn record(&mut self, at: NaiveDateTime, event: &SimEvent) {
        self.push(LoggedEvent { at, event: event.clone() });
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, at: NaiveDateTime, event: &SimEvent) {
        (**self).record(at, event);
    }
}

/// Fan-out: both sinks see every event, `.0` first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn record(&mut self, at: NaiveDateTime, event: &SimEvent) {
        self.0.record(at, event);
        self.1.record(at, event);
    }
}
