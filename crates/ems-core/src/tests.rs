//! Unit tests for ems-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AmbulanceId, EmergencyId, HospitalId};

    #[test]
    fn ordering() {
        assert!(AmbulanceId(0) < AmbulanceId(1));
        assert!(HospitalId(100) > HospitalId(99));
    }

    #[test]
    fn display() {
        assert_eq!(AmbulanceId(7).to_string(), "AmbulanceId(7)");
        assert_eq!(EmergencyId(101).to_string(), "EmergencyId(101)");
    }

    #[test]
    fn from_raw() {
        assert_eq!(EmergencyId::from(5).raw(), 5);
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(40.0, -75.0);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(40.0, -75.0);
        let b = GeoPoint::new(41.0, -75.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = GeoPoint::new(40.0, -75.0);
        let b = GeoPoint::new(40.1, -75.1);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!(mid.approx_eq(GeoPoint::new(40.05, -75.05), 1e-9));
    }

    #[test]
    fn non_finite_detected() {
        assert!(GeoPoint::new(40.0, -75.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, -75.0).is_finite());
    }
}

#[cfg(test)]
mod time {
    use chrono::{Datelike, NaiveDate, Timelike};

    use crate::{EmsError, SimClock, SimConfig, Tick, minutes_between, parse_timestamp};

    fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 27).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_fixed_format() {
        let dt = parse_timestamp("2025-01-27-08-15-00").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 27);
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 15);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn rejects_other_formats() {
        assert!(matches!(
            parse_timestamp("2025-01-27 08:15:00"),
            Err(EmsError::Timestamp { .. })
        ));
        assert!(parse_timestamp("not a time").is_err());
    }

    #[test]
    fn minutes_between_is_signed() {
        assert_eq!(minutes_between(at(8, 0), at(8, 20)), 20.0);
        assert_eq!(minutes_between(at(8, 20), at(8, 0)), -20.0);
    }

    #[test]
    fn clock_advances_and_counts_ticks() {
        let mut clock = SimClock::new(at(8, 0));
        clock.advance_minutes(1);
        clock.advance_minutes(1);
        assert_eq!(clock.now, at(8, 2));
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.elapsed_minutes(), 2.0);
    }

    #[test]
    fn clock_refuses_rewind() {
        let mut clock = SimClock::new(at(8, 0));
        clock.set(at(9, 0)).unwrap();
        assert!(matches!(clock.set(at(8, 30)), Err(EmsError::ClockRewind { .. })));
        assert_eq!(clock.now, at(9, 0));
    }

    #[test]
    fn config_validation() {
        assert!(SimConfig::default().validate().is_ok());
        let bad = SimConfig { tick_minutes: 0, ..SimConfig::default() };
        assert!(bad.validate().is_err());
        let bad = SimConfig { speed_kmh: 0.0, ..SimConfig::default() };
        assert!(bad.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for len in 1..100 {
            assert_eq!(r1.index(len), r2.index(len));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}

#[cfg(test)]
mod decision {
    use crate::{AmbulanceId, Decision, EmergencyId, GeoPoint, HospitalId};

    #[test]
    fn ambulance_accessor_covers_every_variant() {
        let a = AmbulanceId(3);
        let all = [
            Decision::SendAmbulanceToEmergency { ambulance: a, emergency: EmergencyId(1) },
            Decision::SendAmbulanceToHospital { ambulance: a, hospital: HospitalId(2) },
            Decision::ChangeTargetHospital { ambulance: a, hospital: HospitalId(2) },
            Decision::RelocateAmbulance { ambulance: a, target: GeoPoint::new(40.0, -75.0) },
        ];
        assert!(all.iter().all(|d| d.ambulance() == a));
    }

    #[test]
    fn display_names_kind_and_ids() {
        let d = Decision::SendAmbulanceToEmergency { ambulance: AmbulanceId(1), emergency: EmergencyId(101) };
        assert_eq!(d.to_string(), "SendAmbulanceToEmergency(ambulance=1, emergency=101)");
    }
}
