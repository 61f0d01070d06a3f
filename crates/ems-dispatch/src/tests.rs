//! Unit tests for ems-dispatch.

use chrono::NaiveDate;
use ems_core::{AmbulanceId, Decision, EmergencyId, GeoPoint, HospitalId, NaiveDateTime};
use ems_route::{LinearRouter, MaxRangeRouter};
use ems_world::{
    AmbulanceStatus, EmergencyStatus, IgnoreReason, LoggedEvent, NullSink, SimEvent,
    SimulationState, StateBuilder,
};

use crate::{DecisionOutcome, apply_decision, apply_decisions};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 27).unwrap().and_hms_opt(8, 0, 0).unwrap()
}

fn p(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng)
}

const A1: AmbulanceId = AmbulanceId(1);
const A2: AmbulanceId = AmbulanceId(2);
const E101: EmergencyId = EmergencyId(101);
const H10: HospitalId = HospitalId(10);

fn send(ambulance: AmbulanceId, emergency: EmergencyId) -> Decision {
    Decision::SendAmbulanceToEmergency { ambulance, emergency }
}

/// One idle ambulance at (40.0, -75.0), one waiting call at (40.001, -75.001).
fn basic() -> SimulationState {
    StateBuilder::new(t0())
        .ambulance(1, p(40.0, -75.0))
        .ambulance(2, p(40.01, -75.0))
        .broken_ambulance(3, p(40.0, -75.0))
        .hospital(10, p(40.01, -75.01), 2)
        .active_emergency(101, t0(), p(40.001, -75.001), &[10])
        .build()
        .unwrap()
}

/// Apply `d` and return the outcome, panicking on invariant errors.
fn apply(d: Decision, state: &mut SimulationState) -> DecisionOutcome {
    apply_decision(d, state, &LinearRouter::default()).unwrap()
}

/// Put ambulance 1 at the scene of call 101 with the patient on board.
fn on_scene(state: &mut SimulationState) {
    assert!(apply(send(A1, E101), state).is_applied());
    let a = state.ambulance_mut(A1).unwrap();
    while a.advance(1.0).is_some_and(|s| !s.finished) {}
    a.arrive_at_emergency().unwrap();
    state.emergency_mut(E101).unwrap().record_ambulance_arrival(t0()).unwrap();
}

// ── SendAmbulanceToEmergency ──────────────────────────────────────────────────

#[cfg(test)]
mod send_to_emergency {
    use super::*;

    #[test]
    fn valid_dispatch_changes_both_sides() {
        let mut s = basic();
        assert_eq!(apply(send(A1, E101), &mut s), DecisionOutcome::Applied);

        let a = s.ambulance(A1).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::EnRouteToEmergency);
        assert_eq!(a.emergency_assigned(), Some(E101));
        assert!(!a.remaining_route().is_empty());
        assert_eq!(s.emergency(E101).unwrap().status(), EmergencyStatus::WaitingForAmbulance);
    }

    #[test]
    fn broken_ambulance_always_ignored() {
        let mut s = basic();
        for _ in 0..3 {
            let outcome = apply(send(AmbulanceId(3), E101), &mut s);
            assert!(matches!(
                outcome,
                DecisionOutcome::Ignored(IgnoreReason::AmbulanceNotEligible { status: AmbulanceStatus::Broken, .. })
            ));
        }
        assert_eq!(s.emergency(E101).unwrap().status(), EmergencyStatus::WaitingForAssignment);
    }

    #[test]
    fn broken_ambulance_ignored_for_missing_emergency() {
        let mut s = basic();
        let missing = EmergencyId(999);
        for _ in 0..2 {
            assert!(!apply(send(AmbulanceId(3), missing), &mut s).is_applied());
        }

        let a = s.ambulance(AmbulanceId(3)).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::Broken);
        assert_eq!(a.emergency_assigned(), None);
        assert!(!a.has_route());
        assert_eq!(a.position(), p(40.0, -75.0));
        assert!(s.emergency(missing).is_none());
        assert_eq!(s.emergency(E101).unwrap().status(), EmergencyStatus::WaitingForAssignment);
    }

    #[test]
    fn first_legal_claim_wins() {
        let mut s = basic();
        let mut log: Vec<LoggedEvent> = Vec::new();
        let report = apply_decisions(
            [send(A1, E101), send(A2, E101), send(A1, E101)],
            &mut s,
            &LinearRouter::default(),
            &mut log,
        )
        .unwrap();

        assert_eq!(report.applied, vec![send(A1, E101)]);
        assert_eq!(report.ignored.len(), 2);
        assert!(matches!(report.ignored[0].1, IgnoreReason::EmergencyNotEligible { .. }));
        assert!(matches!(report.ignored[1].1, IgnoreReason::AmbulanceNotEligible { .. }));
        assert_eq!(s.ambulance(A2).unwrap().status(), AmbulanceStatus::Idle);

        // One event per decision, in order.
        assert_eq!(log.len(), 3);
        assert!(matches!(log[0].event, SimEvent::DecisionApplied(_)));
        assert!(log[1..].iter().all(|e| matches!(e.event, SimEvent::DecisionIgnored { .. })));
        assert!(log.iter().all(|e| e.at == t0()));
    }

    #[test]
    fn same_illegal_decision_twice_changes_nothing() {
        let mut s = basic();
        let before = s.clone();
        let bogus = send(AmbulanceId(99), E101);
        let report =
            apply_decisions([bogus, bogus], &mut s, &LinearRouter::default(), &mut NullSink).unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.ignored, vec![
            (bogus, IgnoreReason::UnknownAmbulance(AmbulanceId(99))),
            (bogus, IgnoreReason::UnknownAmbulance(AmbulanceId(99))),
        ]);
        assert_eq!(s.ambulances(), before.ambulances());
        assert_eq!(s.emergency(E101), before.emergency(E101));
    }

    #[test]
    fn unknown_and_pending_emergencies_are_unknown() {
        let mut s = StateBuilder::new(t0())
            .ambulance(1, p(40.0, -75.0))
            .emergency(5, t0() + chrono::Duration::minutes(30), p(40.0, -75.0), &[])
            .build()
            .unwrap();
        assert_eq!(
            apply(send(A1, EmergencyId(5)), &mut s),
            DecisionOutcome::Ignored(IgnoreReason::UnknownEmergency(EmergencyId(5)))
        );
        assert_eq!(
            apply(send(A1, EmergencyId(6)), &mut s),
            DecisionOutcome::Ignored(IgnoreReason::UnknownEmergency(EmergencyId(6)))
        );
    }

    #[test]
    fn unreachable_route_has_no_effect() {
        let mut s = basic();
        // Anything further than a tenth of a minute is out of range.
        let short = MaxRangeRouter::new(LinearRouter::default(), 0.1);
        let outcome = apply_decision(send(A1, E101), &mut s, &short).unwrap();
        assert!(matches!(outcome, DecisionOutcome::Ignored(IgnoreReason::Unreachable { .. })));
        assert_eq!(s.ambulance(A1).unwrap().status(), AmbulanceStatus::Idle);
        assert_eq!(s.emergency(E101).unwrap().status(), EmergencyStatus::WaitingForAssignment);
    }
}

// ── Hospital decisions ────────────────────────────────────────────────────────

#[cfg(test)]
mod hospital {
    use super::*;

    #[test]
    fn send_to_hospital_requires_patient() {
        let mut s = basic();
        let d = Decision::SendAmbulanceToHospital { ambulance: A1, hospital: H10 };
        assert!(matches!(apply(d, &mut s), DecisionOutcome::Ignored(IgnoreReason::AmbulanceNotEligible { .. })));

        on_scene(&mut s);
        assert!(apply(d, &mut s).is_applied());
        let a = s.ambulance(A1).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::EnRouteToHospital);
        assert_eq!(a.hospital_assigned(), Some(H10));
        assert_eq!(s.emergency(E101).unwrap().status(), EmergencyStatus::EnRouteToHospital);

        // A second assignment is refused.
        assert!(!apply(d, &mut s).is_applied());
    }

    #[test]
    fn unknown_hospital_reported() {
        let mut s = basic();
        on_scene(&mut s);
        let d = Decision::SendAmbulanceToHospital { ambulance: A1, hospital: HospitalId(77) };
        assert_eq!(apply(d, &mut s), DecisionOutcome::Ignored(IgnoreReason::UnknownHospital(HospitalId(77))));
    }

    #[test]
    fn change_target_only_while_driving_to_hospital() {
        let mut s = StateBuilder::new(t0())
            .ambulance(1, p(40.0, -75.0))
            .hospital(10, p(40.01, -75.01), 2)
            .hospital(11, p(40.05, -75.0), 2)
            .active_emergency(101, t0(), p(40.001, -75.001), &[10])
            .build()
            .unwrap();
        let change = Decision::ChangeTargetHospital { ambulance: A1, hospital: HospitalId(11) };
        assert!(!apply(change, &mut s).is_applied());

        on_scene(&mut s);
        assert!(apply(Decision::SendAmbulanceToHospital { ambulance: A1, hospital: H10 }, &mut s).is_applied());
        assert!(apply(change, &mut s).is_applied());

        let a = s.ambulance(A1).unwrap();
        assert_eq!(a.hospital_assigned(), Some(HospitalId(11)));
        assert_eq!(a.route().unwrap().destination(), p(40.05, -75.0));
    }
}

// ── RelocateAmbulance ─────────────────────────────────────────────────────────

#[cfg(test)]
mod relocate {
    use super::*;

    #[test]
    fn idle_ambulance_relocates() {
        let mut s = basic();
        let d = Decision::RelocateAmbulance { ambulance: A2, target: p(40.02, -75.0) };
        assert!(apply(d, &mut s).is_applied());
        assert_eq!(s.ambulance(A2).unwrap().status(), AmbulanceStatus::Relocating);

        // Relocating again needs an idle ambulance.
        assert!(!apply(d, &mut s).is_applied());
        // ... but a relocating one can still take a call.
        assert!(apply(send(A2, E101), &mut s).is_applied());
    }

    #[test]
    fn non_finite_target_is_unreachable() {
        let mut s = basic();
        let d = Decision::RelocateAmbulance { ambulance: A1, target: p(f64::NAN, -75.0) };
        assert!(matches!(apply(d, &mut s), DecisionOutcome::Ignored(IgnoreReason::Unreachable { .. })));
        assert_eq!(s.ambulance(A1).unwrap().status(), AmbulanceStatus::Idle);
    }
}
