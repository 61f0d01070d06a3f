//! Unit tests for ems-motion.

use chrono::NaiveDate;
use ems_core::{AmbulanceId, EmergencyId, GeoPoint, HospitalId, NaiveDateTime, minutes_between};
use ems_route::{LinearRouter, Route, RouteCursor, Router, Waypoint};
use ems_world::{
    AmbulanceStatus, EmergencyStatus, LoggedEvent, NullSink, SimEvent, SimulationState,
    StateBuilder,
};

use crate::{Arrival, MotionError, move_ambulances_forward};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 27).unwrap().and_hms_opt(8, 0, 0).unwrap()
}

fn p(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng)
}

const A1: AmbulanceId = AmbulanceId(1);
const E101: EmergencyId = EmergencyId(101);
const H10: HospitalId = HospitalId(10);

const SCENE: GeoPoint = GeoPoint { lat: 40.02, lng: -75.0 };

fn cursor(from: GeoPoint, to: GeoPoint) -> RouteCursor {
    RouteCursor::new(from, LinearRouter::default().route(from, to)).unwrap()
}

/// Ambulance 1 at (40.0, -75.0) driving to call 101 about 2.2 km north.
fn dispatched(beds: u32) -> SimulationState {
    let mut state = StateBuilder::new(t0())
        .ambulance(1, p(40.0, -75.0))
        .hospital(10, p(40.05, -75.0), beds)
        .active_emergency(101, t0(), SCENE, &[10])
        .build()
        .unwrap();
    let route = cursor(p(40.0, -75.0), SCENE);
    state.ambulance_mut(A1).unwrap().dispatch_to_emergency(E101, route).unwrap();
    state.emergency_mut(E101).unwrap().assign().unwrap();
    state
}

/// One tick: clock forward one minute, then move.
fn tick(state: &mut SimulationState, log: &mut Vec<LoggedEvent>) -> Vec<Arrival> {
    state.advance_clock(1);
    move_ambulances_forward(state, 1.0, log).unwrap()
}

/// Tick until the first arrival; returns it with the number of ticks taken.
fn run_until_arrival(state: &mut SimulationState, log: &mut Vec<LoggedEvent>) -> (Arrival, u32) {
    for n in 1..=240 {
        if let Some(&first) = tick(state, log).first() {
            return (first, n);
        }
    }
    panic!("no arrival within four hours");
}

/// Load the patient and head for hospital 10.
fn load_and_send(state: &mut SimulationState) {
    let from = state.ambulance(A1).unwrap().position();
    let route = cursor(from, p(40.05, -75.0));
    state.emergency_mut(E101).unwrap().depart_to_hospital().unwrap();
    state.ambulance_mut(A1).unwrap().dispatch_to_hospital(H10, route).unwrap();
}

// ── Route following ───────────────────────────────────────────────────────────

#[cfg(test)]
mod following {
    use super::*;

    #[test]
    fn idle_fleet_produces_no_arrivals() {
        let mut state = StateBuilder::new(t0()).ambulance(1, p(40.0, -75.0)).build().unwrap();
        let arrivals = move_ambulances_forward(&mut state, 10.0, &mut NullSink).unwrap();
        assert!(arrivals.is_empty());
        assert_eq!(state.ambulance(A1).unwrap().position(), p(40.0, -75.0));
    }

    #[test]
    fn position_moves_toward_target_each_minute() {
        let mut state = dispatched(1);
        let mut log = Vec::new();
        let start = state.ambulance(A1).unwrap().position();

        tick(&mut state, &mut log);
        let after_one = state.ambulance(A1).unwrap().position();
        tick(&mut state, &mut log);
        let after_two = state.ambulance(A1).unwrap().position();

        assert!(after_one.distance_m(SCENE) < start.distance_m(SCENE));
        assert!(after_two.distance_m(SCENE) < after_one.distance_m(SCENE));
        assert!(log.is_empty());
    }

    #[test]
    fn one_long_step_matches_many_short_steps() {
        let mut short = dispatched(1);
        let mut long = short.clone();

        for _ in 0..30 {
            move_ambulances_forward(&mut short, 1.0, &mut NullSink).unwrap();
        }
        move_ambulances_forward(&mut long, 30.0, &mut NullSink).unwrap();

        let (a, b) = (short.ambulance(A1).unwrap(), long.ambulance(A1).unwrap());
        assert_eq!(a.status(), AmbulanceStatus::AtEmergency);
        assert_eq!(a.status(), b.status());
        assert!(a.position().approx_eq(b.position(), 1e-9));
    }

    #[test]
    fn hand_built_route_lands_on_each_waypoint() {
        let mut state = StateBuilder::new(t0()).ambulance(1, p(40.0, -75.0)).build().unwrap();
        let route = Route::new(vec![
            Waypoint::new(0.0, p(40.0, -75.0)),
            Waypoint::new(2.0, p(40.01, -75.0)),
            Waypoint::new(4.0, p(40.02, -75.0)),
        ])
        .unwrap();
        let amb = state.ambulance_mut(A1).unwrap();
        amb.relocate(RouteCursor::new(p(40.0, -75.0), route).unwrap()).unwrap();

        move_ambulances_forward(&mut state, 2.0, &mut NullSink).unwrap();
        assert_eq!(state.ambulance(A1).unwrap().position(), p(40.01, -75.0));
        assert_eq!(state.ambulance(A1).unwrap().remaining_route().len(), 1);
    }
}

// ── Arrivals ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrivals {
    use super::*;

    #[test]
    fn reaching_the_scene_loads_the_patient() {
        let mut state = dispatched(1);
        let mut log = Vec::new();
        let (arrival, ticks) = run_until_arrival(&mut state, &mut log);

        assert_eq!(arrival, Arrival::AtEmergency { ambulance: A1, emergency: E101 });
        assert!(ticks > 1);

        let amb = state.ambulance(A1).unwrap();
        assert_eq!(amb.status(), AmbulanceStatus::AtEmergency);
        assert!(amb.contains_patient());
        assert!(amb.position().approx_eq(SCENE, 1e-9));

        let call = state.emergency(E101).unwrap();
        assert_eq!(call.status(), EmergencyStatus::WaitingForAmbulance);
        assert_eq!(call.ambulance_arrival_time(), Some(state.now()));

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event, SimEvent::ArrivedAtEmergency { ambulance: A1, emergency: E101 });
    }

    #[test]
    fn reaching_the_hospital_resolves_the_call() {
        let mut state = dispatched(2);
        let mut log = Vec::new();
        run_until_arrival(&mut state, &mut log);
        load_and_send(&mut state);

        let (arrival, _) = run_until_arrival(&mut state, &mut log);
        assert_eq!(arrival, Arrival::AtHospital { ambulance: A1, hospital: H10, emergency: E101 });

        let amb = state.ambulance(A1).unwrap();
        assert_eq!(amb.status(), AmbulanceStatus::Idle);
        assert!(!amb.contains_patient());
        assert_eq!(amb.emergency_assigned(), None);
        assert_eq!(amb.hospital_assigned(), None);

        assert_eq!(state.hospital(H10).unwrap().free_beds(), 1);
        assert_eq!(state.emergency(E101).unwrap().status(), EmergencyStatus::Finished);
        assert_eq!(state.emergency(E101).unwrap().hospital_arrival_time(), Some(state.now()));
        assert!(state.working_ids().is_empty());
        assert_eq!(state.archived_ids(), &[E101]);
        assert!(state.all_emergencies_resolved());

        let tail: Vec<&SimEvent> = log.iter().rev().take(2).map(|e| &e.event).collect();
        assert_eq!(tail[1], &SimEvent::ArrivedAtHospital { ambulance: A1, hospital: H10, free_beds_left: 1 });
        assert_eq!(tail[0], &SimEvent::EmergencyResolved {
            emergency:      E101,
            total_wait_min: minutes_between(t0(), state.now()),
        });
    }

    #[test]
    fn full_hospital_at_arrival_aborts() {
        let mut state = dispatched(0);
        run_until_arrival(&mut state, &mut Vec::new());
        load_and_send(&mut state);

        let err = (0..240)
            .find_map(|_| {
                state.advance_clock(1);
                move_ambulances_forward(&mut state, 1.0, &mut NullSink).err()
            })
            .unwrap();
        assert!(matches!(err, MotionError::HospitalFull { ambulance: A1, hospital: H10 }));
        // Nothing was committed for the failed arrival.
        assert_eq!(state.emergency(E101).unwrap().status(), EmergencyStatus::EnRouteToHospital);
        assert!(state.ambulance(A1).unwrap().contains_patient());
    }

    #[test]
    fn relocation_ends_idle_at_target() {
        let mut state = StateBuilder::new(t0()).ambulance(1, p(40.0, -75.0)).build().unwrap();
        let target = p(40.01, -75.0);
        state.ambulance_mut(A1).unwrap().relocate(cursor(p(40.0, -75.0), target)).unwrap();

        let mut log = Vec::new();
        let (arrival, _) = run_until_arrival(&mut state, &mut log);
        assert!(matches!(arrival, Arrival::Relocated { ambulance: A1, position } if position.approx_eq(target, 1e-9)));
        assert_eq!(state.ambulance(A1).unwrap().status(), AmbulanceStatus::Idle);
        assert!(matches!(log[0].event, SimEvent::RelocationFinished { ambulance: A1, .. }));
    }

    #[test]
    fn simultaneous_arrivals_fire_in_roster_order() {
        let mut state = StateBuilder::new(t0())
            .ambulance(2, p(40.0, -75.0))
            .ambulance(1, p(40.0, -75.0))
            .build()
            .unwrap();
        let target = p(40.01, -75.0);
        for id in [AmbulanceId(1), AmbulanceId(2)] {
            state.ambulance_mut(id).unwrap().relocate(cursor(p(40.0, -75.0), target)).unwrap();
        }
        let arrivals = move_ambulances_forward(&mut state, 60.0, &mut NullSink).unwrap();
        let order: Vec<AmbulanceId> = arrivals.iter().map(Arrival::ambulance).collect();
        assert_eq!(order, vec![AmbulanceId(2), AmbulanceId(1)]);
    }
}
