//! Fluent builder for hand-assembled `SimulationState`s.
//!
//! # Usage
//!
//! ```rust
//! use ems_core::{GeoPoint, parse_timestamp};
//! use ems_world::StateBuilder;
//!
//! let start = parse_timestamp("2025-01-27-08-00-00").unwrap();
//! let state = StateBuilder::new(start)
//!     .ambulance(1, GeoPoint::new(40.0, -75.0))
//!     .hospital(10, GeoPoint::new(40.1, -75.1), 4)
//!     .emergency(101, start, GeoPoint::new(40.001, -75.001), &[10])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(state.ambulances().len(), 1);
//! assert_eq!(state.pending_count(), 1);
//! ```
//!
//! Entities are validated in `build`, in the order they were added, so the
//! first duplicate id is the one reported.

use ems_core::{
    AmbulanceId, EmergencyId, GeoPoint, HospitalId, NaiveDateTime, StationId, ZoneId,
};

use crate::{
    Ambulance, Emergency, Hospital, KeyZone, RescueStation, SimulationState, WorldResult,
};

enum Entry {
    Ambulance(Ambulance),
    Hospital(Hospital),
    Station(RescueStation),
    Zone(KeyZone),
    Pending(Emergency),
    Working(Emergency),
}

/// Fluent builder for [`SimulationState`].
pub struct StateBuilder {
    start:   NaiveDateTime,
    entries: Vec<Entry>,
}

impl StateBuilder {
    /// Start a state whose clock reads `start`.
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, entries: Vec::new() }
    }

    /// Add an idle ambulance.
    pub fn ambulance(self, id: u32, position: GeoPoint) -> Self {
        self.push(Entry::Ambulance(Ambulance::new(AmbulanceId(id), position, false)))
    }

    /// Add a permanently broken ambulance.
    pub fn broken_ambulance(self, id: u32, position: GeoPoint) -> Self {
        self.push(Entry::Ambulance(Ambulance::new(AmbulanceId(id), position, true)))
    }

    pub fn hospital(self, id: u32, location: GeoPoint, free_beds: u32) -> Self {
        self.push(Entry::Hospital(Hospital::new(HospitalId(id), location, free_beds)))
    }

    pub fn station(self, id: u32, location: GeoPoint) -> Self {
        self.push(Entry::Station(RescueStation { id: StationId(id), location }))
    }

    pub fn key_zone(self, id: u32, location: GeoPoint) -> Self {
        self.push(Entry::Zone(KeyZone { id: ZoneId(id), location }))
    }

    /// Queue a future call, activated once the clock reaches `at`.
    pub fn emergency(self, id: u32, at: NaiveDateTime, location: GeoPoint, hospitals: &[u32]) -> Self {
        self.push(Entry::Pending(Self::call(id, at, location, hospitals)))
    }

    /// Add a call that is already in the working set.
    pub fn active_emergency(self, id: u32, at: NaiveDateTime, location: GeoPoint, hospitals: &[u32]) -> Self {
        self.push(Entry::Working(Self::call(id, at, location, hospitals)))
    }

    /// Construct the state.  Queued calls stay pending until the clock moves.
    pub fn build(self) -> WorldResult<SimulationState> {
        let mut state = SimulationState::new(self.start);
        for entry in self.entries {
            match entry {
                Entry::Ambulance(a) => state.add_ambulance(a)?,
                Entry::Hospital(h) => state.add_hospital(h)?,
                Entry::Station(s) => state.add_station(s)?,
                Entry::Zone(z) => state.add_zone(z)?,
                Entry::Pending(e) => state.add_emergency(e)?,
                Entry::Working(e) => state.activate_emergency(e)?,
            }
        }
        Ok(state)
    }

    fn push(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    fn call(id: u32, at: NaiveDateTime, location: GeoPoint, hospitals: &[u32]) -> Emergency {
        let hospitals = hospitals.iter().map(|&h| HospitalId(h)).collect();
        Emergency::new(EmergencyId(id), at, location, hospitals)
    }
}
