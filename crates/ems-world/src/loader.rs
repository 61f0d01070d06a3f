//! JSON map and scenario loaders.
//!
//! # Map format
//!
//! ```json
//! { "ambulances":      [{"id": 1, "lat": 40.0, "lng": -75.0, "broken": false}],
//!   "hospitals":       [{"id": 10, "lat": 40.1, "lng": -75.1, "free_beds": 4}],
//!   "rescue_stations": [{"id": 1, "lat": 40.05, "lng": -75.02}],
//!   "key_zones":       [{"id": 1, "lat": 40.02, "lng": -75.03}] }
//! ```
//!
//! `broken`, `rescue_stations` and `key_zones` are optional.
//!
//! # Scenario format
//!
//! ```json
//! { "emergencies": [{"id": 101, "timestamp": "2025-01-27-08-15-00",
//!                    "lat": 40.001, "lng": -75.001, "hospitals": [10]}] }
//! ```
//!
//! Timestamps use the fixed `YYYY-MM-DD-HH-MM-SS` layout.  Every entry is
//! decoded on its own so that errors carry a field path such as
//! `emergencies[3].timestamp` next to the origin (file path or reader label).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use ems_core::{
    AmbulanceId, EmergencyId, GeoPoint, HospitalId, StationId, ZoneId, parse_timestamp,
};

use crate::{
    Ambulance, Emergency, Hospital, KeyZone, RescueStation, SimulationState, WorldError,
    WorldResult,
};

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MapDocument {
    ambulances:      Vec<Value>,
    hospitals:       Vec<Value>,
    #[serde(default)]
    rescue_stations: Vec<Value>,
    #[serde(default)]
    key_zones:       Vec<Value>,
}

#[derive(Deserialize)]
struct ScenarioDocument {
    emergencies: Vec<Value>,
}

#[derive(Deserialize)]
struct AmbulanceRecord {
    id:     u32,
    lat:    f64,
    lng:    f64,
    #[serde(default)]
    broken: bool,
}

#[derive(Deserialize)]
struct HospitalRecord {
    id:        u32,
    lat:       f64,
    lng:       f64,
    /// Signed so a negative count is reported as such instead of as a type error.
    free_beds: i64,
}

#[derive(Deserialize)]
struct MarkerRecord {
    id:  u32,
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct EmergencyRecord {
    id:        u32,
    timestamp: String,
    lat:       f64,
    lng:       f64,
    #[serde(default)]
    hospitals: Vec<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the static roster from a JSON file into a fresh state.
///
/// The returned state's clock is unset until a scenario is loaded into it.
pub fn load_map_path(path: &Path) -> WorldResult<SimulationState> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|source| WorldError::Io { origin: origin.clone(), source })?;
    load_map_reader(BufReader::new(file), &origin)
}

/// Like [`load_map_path`] but accepts any `Read` source.  `origin` labels
/// the source in error messages.
pub fn load_map_reader<R: Read>(reader: R, origin: &str) -> WorldResult<SimulationState> {
    let doc: MapDocument = parse_document(reader, origin)?;
    let mut state = SimulationState::default();

    for (i, raw) in doc.ambulances.into_iter().enumerate() {
        let path = format!("ambulances[{i}]");
        let rec: AmbulanceRecord = decode_entry(raw, origin, &path)?;
        let pos = checked_point(rec.lat, rec.lng, origin, &path)?;
        state
            .add_ambulance(Ambulance::new(AmbulanceId(rec.id), pos, rec.broken))
            .map_err(|e| relabel(e, origin))?;
    }

    for (i, raw) in doc.hospitals.into_iter().enumerate() {
        let path = format!("hospitals[{i}]");
        let rec: HospitalRecord = decode_entry(raw, origin, &path)?;
        let pos = checked_point(rec.lat, rec.lng, origin, &path)?;
        let free_beds = u32::try_from(rec.free_beds).map_err(|_| WorldError::Malformed {
            origin: origin.to_owned(),
            field:  format!("{path}.free_beds"),
            reason: format!("bed count {} is out of range", rec.free_beds),
        })?;
        state
            .add_hospital(Hospital::new(HospitalId(rec.id), pos, free_beds))
            .map_err(|e| relabel(e, origin))?;
    }

    for (i, raw) in doc.rescue_stations.into_iter().enumerate() {
        let path = format!("rescue_stations[{i}]");
        let rec: MarkerRecord = decode_entry(raw, origin, &path)?;
        let location = checked_point(rec.lat, rec.lng, origin, &path)?;
        state
            .add_station(RescueStation { id: StationId(rec.id), location })
            .map_err(|e| relabel(e, origin))?;
    }

    for (i, raw) in doc.key_zones.into_iter().enumerate() {
        let path = format!("key_zones[{i}]");
        let rec: MarkerRecord = decode_entry(raw, origin, &path)?;
        let location = checked_point(rec.lat, rec.lng, origin, &path)?;
        state
            .add_zone(KeyZone { id: ZoneId(rec.id), location })
            .map_err(|e| relabel(e, origin))?;
    }

    Ok(state)
}

/// Load a scenario file into `state` as pending emergencies.
///
/// Returns the number of emergencies added.
pub fn load_scenario_path(state: &mut SimulationState, path: &Path) -> WorldResult<usize> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|source| WorldError::Io { origin: origin.clone(), source })?;
    load_scenario_reader(state, BufReader::new(file), &origin)
}

/// Like [`load_scenario_path`] but accepts any `Read` source.
///
/// Emergencies are queued in timestamp order; calls sharing a timestamp keep
/// their input order.  Every eligible hospital id must already exist in
/// `state`, so load the map first.  The whole file is validated before
/// `state` is touched: on error nothing is added.
///
/// If `state` was created without an explicit start time and has not run
/// yet, its clock is moved to the earliest call time.
pub fn load_scenario_reader<R: Read>(
    state:  &mut SimulationState,
    reader: R,
    origin: &str,
) -> WorldResult<usize> {
    let doc: ScenarioDocument = parse_document(reader, origin)?;

    // ── Validate every entry before mutating ──────────────────────────────
    let mut calls: Vec<Emergency> = Vec::with_capacity(doc.emergencies.len());
    let mut seen = std::collections::HashSet::with_capacity(doc.emergencies.len());

    for (i, raw) in doc.emergencies.into_iter().enumerate() {
        let path = format!("emergencies[{i}]");
        let rec: EmergencyRecord = decode_entry(raw, origin, &path)?;

        let id = EmergencyId(rec.id);
        if !seen.insert(id) || state.emergency(id).is_some() {
            return Err(WorldError::DuplicateId { origin: origin.to_owned(), kind: "emergency", id: rec.id });
        }

        let timestamp = parse_timestamp(&rec.timestamp).map_err(|e| WorldError::Malformed {
            origin: origin.to_owned(),
            field:  format!("{path}.timestamp"),
            reason: e.to_string(),
        })?;
        let location = checked_point(rec.lat, rec.lng, origin, &path)?;

        let mut hospitals = Vec::with_capacity(rec.hospitals.len());
        for (j, raw_id) in rec.hospitals.into_iter().enumerate() {
            let hid = HospitalId(raw_id);
            if state.hospital(hid).is_none() {
                return Err(WorldError::UnknownReference {
                    origin: origin.to_owned(),
                    field:  format!("{path}.hospitals[{j}]"),
                    id:     raw_id,
                });
            }
            hospitals.push(hid);
        }

        calls.push(Emergency::new(id, timestamp, location, hospitals));
    }

    // Stable: equal timestamps keep input order.
    calls.sort_by_key(Emergency::timestamp);

    if let Some(first) = calls.first().map(Emergency::timestamp) {
        if state.clock_follows_scenario() {
            state.restart_clock(first);
        }
    }

    let added = calls.len();
    for call in calls {
        state.add_emergency(call).map_err(|e| relabel(e, origin))?;
    }
    Ok(added)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_document<T: DeserializeOwned, R: Read>(reader: R, origin: &str) -> WorldResult<T> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            WorldError::Io { origin: origin.to_owned(), source: e.into() }
        } else {
            WorldError::Malformed { origin: origin.to_owned(), field: "$".to_owned(), reason: e.to_string() }
        }
    })
}

fn decode_entry<T: DeserializeOwned>(raw: Value, origin: &str, path: &str) -> WorldResult<T> {
    serde_json::from_value(raw).map_err(|e| WorldError::Malformed {
        origin: origin.to_owned(),
        field:  path.to_owned(),
        reason: e.to_string(),
    })
}

fn checked_point(lat: f64, lng: f64, origin: &str, path: &str) -> WorldResult<GeoPoint> {
    let bad = |field: &str, value: f64, limit: f64| WorldError::Malformed {
        origin: origin.to_owned(),
        field:  format!("{path}.{field}"),
        reason: format!("{value} is not a coordinate in [-{limit}, {limit}]"),
    };
    if !lat.is_finite() || lat.abs() > 90.0 {
        return Err(bad("lat", lat, 90.0));
    }
    if !lng.is_finite() || lng.abs() > 180.0 {
        return Err(bad("lng", lng, 180.0));
    }
    Ok(GeoPoint::new(lat, lng))
}

/// Swap the generic `"state"` origin on roster errors for the file label.
fn relabel(err: WorldError, origin: &str) -> WorldError {
    match err {
        WorldError::DuplicateId { kind, id, .. } => {
            WorldError::DuplicateId { origin: origin.to_owned(), kind, id }
        }
        other => other,
    }
}
