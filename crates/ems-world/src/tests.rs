//! Unit tests for ems-world.

#[cfg(test)]
mod helpers {
    use chrono::NaiveDate;
    use ems_core::{GeoPoint, NaiveDateTime};
    use ems_route::{LinearRouter, RouteCursor, Router};

    pub fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 27).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    pub fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    pub fn cursor(from: GeoPoint, to: GeoPoint) -> RouteCursor {
        RouteCursor::new(from, LinearRouter::default().route(from, to)).unwrap()
    }
}

#[cfg(test)]
mod ambulance {
    use super::helpers::{cursor, p};
    use crate::{Ambulance, AmbulanceStatus, WorldError};
    use ems_core::{AmbulanceId, EmergencyId, HospitalId};

    #[test]
    fn new_reflects_broken_flag() {
        assert_eq!(Ambulance::new(AmbulanceId(1), p(40.0, -75.0), false).status(), AmbulanceStatus::Idle);
        assert_eq!(Ambulance::new(AmbulanceId(1), p(40.0, -75.0), true).status(), AmbulanceStatus::Broken);
    }

    #[test]
    fn idle_cannot_jump_to_at_emergency() {
        let mut a = Ambulance::new(AmbulanceId(1), p(40.0, -75.0), false);
        assert!(matches!(a.arrive_at_emergency(), Err(WorldError::IllegalTransition { .. })));
        assert_eq!(a.status(), AmbulanceStatus::Idle);
        assert!(!a.contains_patient());
    }

    #[test]
    fn broken_cannot_be_dispatched_or_relocated() {
        let start = p(40.0, -75.0);
        let mut a = Ambulance::new(AmbulanceId(1), start, true);
        assert!(!a.is_available());
        assert!(a.dispatch_to_emergency(EmergencyId(1), cursor(start, p(40.01, -75.0))).is_err());
        assert!(a.relocate(cursor(start, p(40.01, -75.0))).is_err());
        assert_eq!(a.status(), AmbulanceStatus::Broken);
        assert!(!a.has_route());
    }

    #[test]
    fn full_call_cycle() {
        let start = p(40.0, -75.0);
        let scene = p(40.01, -75.0);
        let hospital = p(40.02, -75.0);
        let mut a = Ambulance::new(AmbulanceId(1), start, false);

        a.dispatch_to_emergency(EmergencyId(7), cursor(start, scene)).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::EnRouteToEmergency);
        assert_eq!(a.emergency_assigned(), Some(EmergencyId(7)));

        // Arrival is refused while route remains.
        assert!(a.arrive_at_emergency().is_err());
        while a.advance(1.0).is_some_and(|s| !s.finished) {}
        assert_eq!(a.position(), scene);
        assert_eq!(a.arrive_at_emergency().unwrap(), EmergencyId(7));
        assert!(a.contains_patient());

        a.dispatch_to_hospital(HospitalId(3), cursor(scene, hospital)).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::EnRouteToHospital);
        // A second hospital dispatch is illegal once one is assigned.
        assert!(a.dispatch_to_hospital(HospitalId(4), cursor(scene, hospital)).is_err());

        while a.advance(1.0).is_some_and(|s| !s.finished) {}
        assert_eq!(a.hand_over_patient().unwrap(), (EmergencyId(7), HospitalId(3)));
        assert_eq!(a.status(), AmbulanceStatus::Idle);
        assert!(a.emergency_assigned().is_none());
        assert!(a.hospital_assigned().is_none());
        assert!(!a.contains_patient());
    }

    #[test]
    fn relocating_ambulance_is_available_and_can_be_dispatched() {
        let start = p(40.0, -75.0);
        let mut a = Ambulance::new(AmbulanceId(1), start, false);
        a.relocate(cursor(start, p(40.05, -75.0))).unwrap();
        assert!(a.is_available());
        a.advance(1.0);
        let here = a.position();
        a.dispatch_to_emergency(EmergencyId(1), cursor(here, p(39.99, -75.0))).unwrap();
        assert_eq!(a.status(), AmbulanceStatus::EnRouteToEmergency);
    }

    #[test]
    fn relocation_finishes_to_idle() {
        let start = p(40.0, -75.0);
        let mut a = Ambulance::new(AmbulanceId(1), start, false);
        a.relocate(cursor(start, p(40.001, -75.0))).unwrap();
        assert!(a.finish_relocation().is_err());
        while a.advance(1.0).is_some_and(|s| !s.finished) {}
        a.finish_relocation().unwrap();
        assert_eq!(a.status(), AmbulanceStatus::Idle);
    }

    #[test]
    fn remaining_route_is_relative() {
        let start = p(40.0, -75.0);
        let mut a = Ambulance::new(AmbulanceId(1), start, false);
        a.relocate(cursor(start, p(40.05, -75.0))).unwrap();
        let before = a.remaining_route();
        a.advance(1.0);
        let after = a.remaining_route();
        // The waypoints at minute 0 and minute 1 are both consumed.
        assert_eq!(after.len() + 2, before.len());
        assert!((after[0].offset_min - 1.0).abs() < 1e-9);
        assert!(after.windows(2).all(|w| w[0].offset_min < w[1].offset_min));
    }
}

#[cfg(test)]
mod emergency {
    use super::helpers::{at, p};
    use crate::{Emergency, EmergencyStatus};
    use ems_core::EmergencyId;

    #[test]
    fn lifecycle_in_order() {
        let mut e = Emergency::new(EmergencyId(1), at(8, 0), p(40.0, -75.0), vec![]);
        assert_eq!(e.status(), EmergencyStatus::WaitingForAssignment);
        assert!(e.depart_to_hospital().is_err());

        e.assign().unwrap();
        assert!(e.assign().is_err());
        e.record_ambulance_arrival(at(8, 5)).unwrap();
        e.depart_to_hospital().unwrap();
        assert!(!e.resolved());
        e.finish(at(8, 20)).unwrap();

        assert!(e.resolved());
        assert_eq!(e.status(), EmergencyStatus::Finished);
        assert_eq!(e.ambulance_arrival_time(), Some(at(8, 5)));
        assert_eq!(e.hospital_arrival_time(), Some(at(8, 20)));
    }

    #[test]
    fn cannot_finish_from_waiting() {
        let mut e = Emergency::new(EmergencyId(1), at(8, 0), p(40.0, -75.0), vec![]);
        assert!(e.finish(at(9, 0)).is_err());
        assert!(!e.resolved());
    }
}

#[cfg(test)]
mod hospital {
    use super::helpers::p;
    use crate::{Hospital, WorldError};
    use ems_core::HospitalId;

    #[test]
    fn admit_until_full() {
        let mut h = Hospital::new(HospitalId(1), p(40.0, -75.0), 2);
        assert_eq!(h.admit().unwrap(), 1);
        assert_eq!(h.admit().unwrap(), 0);
        assert!(!h.has_free_bed());
        assert!(matches!(h.admit(), Err(WorldError::NoFreeBeds(HospitalId(1)))));
        assert_eq!(h.free_beds(), 0);
    }
}

#[cfg(test)]
mod pending {
    use super::helpers::at;
    use crate::PendingQueue;
    use ems_core::EmergencyId;

    #[test]
    fn drains_due_prefix_in_order() {
        let mut q = PendingQueue::new();
        q.push(at(8, 10), EmergencyId(3));
        q.push(at(8, 0), EmergencyId(1));
        q.push(at(8, 0), EmergencyId(2));
        assert_eq!(q.len(), 3);
        assert_eq!(q.next_time(), Some(at(8, 0)));

        assert_eq!(q.drain_due(at(8, 5)), vec![EmergencyId(1), EmergencyId(2)]);
        assert_eq!(q.len(), 1);
        assert!(q.drain_due(at(8, 5)).is_empty());
        assert_eq!(q.drain_due(at(8, 10)), vec![EmergencyId(3)]);
        assert!(q.is_empty());
    }
}

#[cfg(test)]
mod state {
    use super::helpers::{at, p};
    use crate::{Emergency, StateBuilder, WorldError};
    use ems_core::{AmbulanceId, EmergencyId, EmsError};

    fn two_calls() -> crate::SimulationState {
        StateBuilder::new(at(8, 0))
            .ambulance(1, p(40.0, -75.0))
            .hospital(10, p(40.1, -75.1), 4)
            .emergency(101, at(8, 2), p(40.001, -75.001), &[10])
            .emergency(102, at(8, 5), p(40.002, -75.002), &[10])
            .build()
            .unwrap()
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = StateBuilder::new(at(8, 0))
            .ambulance(1, p(40.0, -75.0))
            .ambulance(1, p(40.0, -75.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, WorldError::DuplicateId { kind: "ambulance", id: 1, .. }));
    }

    #[test]
    fn activation_happens_exactly_once() {
        let mut s = two_calls();
        assert_eq!(s.pending_count(), 2);

        assert!(s.advance_clock(1).is_empty());
        assert_eq!(s.advance_clock(1), vec![EmergencyId(101)]);
        assert!(s.advance_clock(1).is_empty());
        assert_eq!(s.working_ids(), &[EmergencyId(101)]);

        assert_eq!(s.set_clock(at(9, 0)).unwrap(), vec![EmergencyId(102)]);
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.working_ids(), &[EmergencyId(101), EmergencyId(102)]);
        assert!(s.set_clock(at(9, 30)).unwrap().is_empty());
    }

    #[test]
    fn clock_rewind_is_rejected() {
        let mut s = two_calls();
        s.set_clock(at(8, 3)).unwrap();
        let err = s.set_clock(at(8, 1)).unwrap_err();
        assert!(matches!(err, WorldError::Core(EmsError::ClockRewind { .. })));
        assert_eq!(s.now(), at(8, 3));
    }

    #[test]
    fn archive_requires_resolution() {
        let mut s = two_calls();
        s.set_clock(at(8, 2)).unwrap();
        let id = EmergencyId(101);
        assert!(matches!(s.archive_emergency(id), Err(WorldError::NotResolved(_))));
        assert!(matches!(s.archive_emergency(EmergencyId(999)), Err(WorldError::UnknownEmergency(_))));

        let e = s.emergency_mut(id).unwrap();
        e.assign().unwrap();
        e.record_ambulance_arrival(at(8, 3)).unwrap();
        e.depart_to_hospital().unwrap();
        e.finish(at(8, 9)).unwrap();
        s.archive_emergency(id).unwrap();

        assert!(s.working_ids().is_empty());
        assert_eq!(s.archived_ids(), &[id]);
    }

    #[test]
    fn all_resolved_tracks_pending_and_working() {
        let mut s = StateBuilder::new(at(8, 0)).build().unwrap();
        assert!(s.all_emergencies_resolved());

        s.add_emergency(Emergency::new(EmergencyId(1), at(8, 1), p(40.0, -75.0), vec![])).unwrap();
        assert!(!s.all_emergencies_resolved());
        s.advance_clock(1);
        assert!(!s.all_emergencies_resolved());

        let e = s.emergency_mut(EmergencyId(1)).unwrap();
        e.assign().unwrap();
        e.record_ambulance_arrival(at(8, 1)).unwrap();
        e.depart_to_hospital().unwrap();
        e.finish(at(8, 1)).unwrap();
        assert!(s.all_emergencies_resolved());
    }

    #[test]
    fn lookups_by_id() {
        let s = two_calls();
        assert!(s.ambulance(AmbulanceId(1)).is_some());
        assert!(s.ambulance(AmbulanceId(2)).is_none());
        assert_eq!(s.emergency_count(), 2);
        assert_eq!(s.next_pending_time(), Some(at(8, 2)));
    }
}

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use super::helpers::at;
    use crate::{WorldError, load_map_path, load_map_reader, load_scenario_path, load_scenario_reader};
    use ems_core::{AmbulanceId, EmergencyId, HospitalId};

    const MAP: &str = r#"{
        "ambulances": [{"id": 1, "lat": 40.0, "lng": -75.0},
                       {"id": 2, "lat": 40.01, "lng": -75.01, "broken": true}],
        "hospitals": [{"id": 10, "lat": 40.1, "lng": -75.1, "free_beds": 4}],
        "rescue_stations": [{"id": 1, "lat": 40.05, "lng": -75.02}]
    }"#;

    fn map() -> crate::SimulationState {
        load_map_reader(Cursor::new(MAP), "map.json").unwrap()
    }

    #[test]
    fn loads_roster() {
        let s = map();
        assert_eq!(s.ambulances().len(), 2);
        assert!(s.ambulance(AmbulanceId(2)).unwrap().status() == crate::AmbulanceStatus::Broken);
        assert_eq!(s.hospital(HospitalId(10)).unwrap().free_beds(), 4);
        assert_eq!(s.rescue_stations().len(), 1);
        assert!(s.key_zones().is_empty());
    }

    #[test]
    fn negative_beds_name_field() {
        let bad = r#"{"ambulances": [], "hospitals": [{"id": 1, "lat": 0, "lng": 0, "free_beds": -1}]}"#;
        let err = load_map_reader(Cursor::new(bad), "map.json").unwrap_err();
        assert!(err.is_malformed_input());
        let msg = err.to_string();
        assert!(msg.contains("map.json"), "{msg}");
        assert!(msg.contains("hospitals[0].free_beds"), "{msg}");
    }

    #[test]
    fn out_of_range_coordinate_names_field() {
        let bad = r#"{"ambulances": [{"id": 1, "lat": 140.0, "lng": 0}], "hospitals": []}"#;
        let err = load_map_reader(Cursor::new(bad), "map.json").unwrap_err();
        assert!(err.to_string().contains("ambulances[0].lat"));
    }

    #[test]
    fn scenario_sorted_with_stable_ties_and_clock_aligned() {
        let mut s = map();
        let scenario = r#"{"emergencies": [
            {"id": 3, "timestamp": "2025-01-27-08-30-00", "lat": 40.0, "lng": -75.0, "hospitals": [10]},
            {"id": 1, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0},
            {"id": 2, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0}
        ]}"#;
        assert_eq!(load_scenario_reader(&mut s, Cursor::new(scenario), "s.json").unwrap(), 3);
        assert_eq!(s.now(), at(8, 15));

        assert_eq!(s.activate_due(), vec![EmergencyId(1), EmergencyId(2)]);
        assert_eq!(s.set_clock(at(8, 30)).unwrap(), vec![EmergencyId(3)]);
    }

    #[test]
    fn bad_timestamp_names_index_and_leaves_state_untouched() {
        let mut s = map();
        let scenario = r#"{"emergencies": [
            {"id": 1, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0},
            {"id": 2, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0},
            {"id": 3, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0},
            {"id": 4, "timestamp": "27/01/2025 08:15", "lat": 40.0, "lng": -75.0}
        ]}"#;
        let err = load_scenario_reader(&mut s, Cursor::new(scenario), "s.json").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("s.json"), "{msg}");
        assert!(msg.contains("emergencies[3].timestamp"), "{msg}");
        assert_eq!(s.emergency_count(), 0);
    }

    #[test]
    fn unknown_hospital_reference() {
        let mut s = map();
        let scenario = r#"{"emergencies": [
            {"id": 1, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0, "hospitals": [10, 99]}
        ]}"#;
        let err = load_scenario_reader(&mut s, Cursor::new(scenario), "s.json").unwrap_err();
        assert!(matches!(err, WorldError::UnknownReference { id: 99, .. }));
        assert!(err.to_string().contains("emergencies[0].hospitals[1]"));
    }

    #[test]
    fn wrong_type_names_entry() {
        let mut s = map();
        let scenario = r#"{"emergencies": [{"id": 1, "timestamp": "2025-01-27-08-15-00", "lat": "north", "lng": 0}]}"#;
        let err = load_scenario_reader(&mut s, Cursor::new(scenario), "s.json").unwrap_err();
        assert!(err.to_string().contains("emergencies[0]"));
    }

    #[test]
    fn explicit_start_is_kept() {
        let mut s = crate::StateBuilder::new(at(7, 0)).hospital(10, ems_core::GeoPoint::new(40.1, -75.1), 1).build().unwrap();
        let scenario = r#"{"emergencies": [{"id": 1, "timestamp": "2025-01-27-08-15-00", "lat": 40.0, "lng": -75.0}]}"#;
        load_scenario_reader(&mut s, Cursor::new(scenario), "s.json").unwrap();
        assert_eq!(s.now(), at(7, 0));
    }

    #[test]
    fn path_loaders_report_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let map_path = dir.path().join("map.json");
        std::fs::File::create(&map_path).unwrap().write_all(MAP.as_bytes()).unwrap();
        let mut s = load_map_path(&map_path).unwrap();

        let scenario_path = dir.path().join("scenario.json");
        std::fs::File::create(&scenario_path)
            .unwrap()
            .write_all(br#"{"emergencies": [{"id": 1, "timestamp": "bogus", "lat": 0, "lng": 0}]}"#)
            .unwrap();
        let err = load_scenario_path(&mut s, &scenario_path).unwrap_err();
        assert!(err.to_string().contains("scenario.json"));

        let missing = load_map_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, WorldError::Io { .. }));
    }
}

#[cfg(test)]
mod event {
    use super::helpers::p;
    use crate::{AmbulanceStatus, EventSink, IgnoreReason, LoggedEvent, SimEvent};
    use ems_core::{AmbulanceId, Decision, EmergencyId};

    #[test]
    fn ignore_reason_classes() {
        assert!(IgnoreReason::UnknownAmbulance(AmbulanceId(1)).is_unknown_id());
        let r = IgnoreReason::AmbulanceNotEligible {
            ambulance: AmbulanceId(1),
            status:    AmbulanceStatus::Broken,
            requires:  "idle or relocating",
        };
        assert!(!r.is_unknown_id());
        assert!(r.to_string().contains("broken"));
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut log: Vec<LoggedEvent> = Vec::new();
        let now = super::helpers::at(8, 0);
        let d = Decision::SendAmbulanceToEmergency { ambulance: AmbulanceId(1), emergency: EmergencyId(2) };
        log.record(now, &SimEvent::EmergencyActivated { emergency: EmergencyId(2), location: p(40.0, -75.0) });
        log.record(now, &SimEvent::DecisionApplied(d));
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].event.kind(), "decision_applied");
        assert!(log[1].event.to_string().starts_with("APPLIED SendAmbulanceToEmergency"));
    }

    #[test]
    fn pair_sink_feeds_both_sides() {
        let mut pair: (Vec<LoggedEvent>, Vec<LoggedEvent>) = (Vec::new(), Vec::new());
        let now = super::helpers::at(8, 0);
        pair.record(now, &SimEvent::RelocationFinished { ambulance: AmbulanceId(3), position: p(40.0, -75.0) });
        assert_eq!(pair.0, pair.1);
        assert_eq!(pair.0.len(), 1);
    }
}
