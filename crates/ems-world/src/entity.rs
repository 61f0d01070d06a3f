//! Ambulances, emergencies, hospitals and static location markers.
//!
//! Status fields are private.  Every lifecycle change goes through a
//! transition method that checks the current status and returns
//! [`WorldError::IllegalTransition`] for any path the state machine does not
//! allow, so no caller can, for example, move an idle ambulance straight to
//! `AtEmergency`.

use std::fmt;

use ems_core::{AmbulanceId, EmergencyId, GeoPoint, HospitalId, NaiveDateTime, StationId, ZoneId};
use ems_route::{Advance, RouteCursor, Waypoint};

use crate::{WorldError, WorldResult};

// ── Statuses ──────────────────────────────────────────────────────────────────

/// Ambulance lifecycle status.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AmbulanceStatus {
    #[default]
    Idle,
    Broken,
    EnRouteToEmergency,
    AtEmergency,
    EnRouteToHospital,
    Relocating,
}

impl AmbulanceStatus {
    /// Label used in event logs and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            AmbulanceStatus::Idle               => "idle",
            AmbulanceStatus::Broken             => "broken",
            AmbulanceStatus::EnRouteToEmergency => "en_route_to_emergency",
            AmbulanceStatus::AtEmergency        => "at_emergency",
            AmbulanceStatus::EnRouteToHospital  => "en_route_to_hospital",
            AmbulanceStatus::Relocating         => "relocating",
        }
    }
}

impl fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emergency lifecycle status.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmergencyStatus {
    #[default]
    WaitingForAssignment,
    WaitingForAmbulance,
    EnRouteToHospital,
    Finished,
}

impl EmergencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmergencyStatus::WaitingForAssignment => "waiting_for_assignment",
            EmergencyStatus::WaitingForAmbulance  => "waiting_for_ambulance",
            EmergencyStatus::EnRouteToHospital    => "en_route_to_hospital",
            EmergencyStatus::Finished             => "finished",
        }
    }
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Ambulance ─────────────────────────────────────────────────────────────────

/// A vehicle in the static roster.  Never deleted; may be permanently broken.
#[derive(Clone, Debug, PartialEq)]
pub struct Ambulance {
    id:                 AmbulanceId,
    position:           GeoPoint,
    status:             AmbulanceStatus,
    emergency_assigned: Option<EmergencyId>,
    hospital_assigned:  Option<HospitalId>,
    contains_patient:   bool,
    /// `None` ⇔ the remaining route is empty.
    route:              Option<RouteCursor>,
}

impl Ambulance {
    /// A stationary ambulance, idle or broken.
    pub fn new(id: AmbulanceId, position: GeoPoint, broken: bool) -> Self {
        Self {
            id,
            position,
            status: if broken { AmbulanceStatus::Broken } else { AmbulanceStatus::Idle },
            emergency_assigned: None,
            hospital_assigned: None,
            contains_patient: false,
            route: None,
        }
    }

    #[inline]
    pub fn id(&self) -> AmbulanceId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    #[inline]
    pub fn status(&self) -> AmbulanceStatus {
        self.status
    }

    #[inline]
    pub fn emergency_assigned(&self) -> Option<EmergencyId> {
        self.emergency_assigned
    }

    #[inline]
    pub fn hospital_assigned(&self) -> Option<HospitalId> {
        self.hospital_assigned
    }

    #[inline]
    pub fn contains_patient(&self) -> bool {
        self.contains_patient
    }

    /// The route still to travel, if any.
    #[inline]
    pub fn route(&self) -> Option<&RouteCursor> {
        self.route.as_ref()
    }

    /// Unconsumed waypoints, offsets relative to now.  Empty once arrived.
    pub fn remaining_route(&self) -> Vec<Waypoint> {
        self.route.as_ref().map(|c| c.remaining().collect()).unwrap_or_default()
    }

    /// `true` if the ambulance has somewhere left to go.
    #[inline]
    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    /// Idle or relocating with no emergency: eligible for a new call.
    pub fn is_available(&self) -> bool {
        matches!(self.status, AmbulanceStatus::Idle | AmbulanceStatus::Relocating)
            && self.emergency_assigned.is_none()
    }

    fn illegal(&self, to: AmbulanceStatus) -> WorldError {
        WorldError::IllegalTransition {
            entity: self.id.to_string(),
            from:   self.status.as_str(),
            to:     to.as_str(),
        }
    }

    // ── Decision-driven transitions ───────────────────────────────────────

    /// idle | relocating → en_route_to_emergency.
    pub fn dispatch_to_emergency(&mut self, emergency: EmergencyId, route: RouteCursor) -> WorldResult<()> {
        if !self.is_available() {
            return Err(self.illegal(AmbulanceStatus::EnRouteToEmergency));
        }
        self.status = AmbulanceStatus::EnRouteToEmergency;
        self.emergency_assigned = Some(emergency);
        self.route = Some(route);
        Ok(())
    }

    /// Carrying a patient with no hospital yet → en_route_to_hospital.
    pub fn dispatch_to_hospital(&mut self, hospital: HospitalId, route: RouteCursor) -> WorldResult<()> {
        if self.emergency_assigned.is_none() || self.hospital_assigned.is_some() || !self.contains_patient {
            return Err(self.illegal(AmbulanceStatus::EnRouteToHospital));
        }
        self.status = AmbulanceStatus::EnRouteToHospital;
        self.hospital_assigned = Some(hospital);
        self.route = Some(route);
        Ok(())
    }

    /// en_route_to_hospital → en_route_to_hospital with a new target.
    pub fn retarget_hospital(&mut self, hospital: HospitalId, route: RouteCursor) -> WorldResult<()> {
        if self.status != AmbulanceStatus::EnRouteToHospital {
            return Err(self.illegal(AmbulanceStatus::EnRouteToHospital));
        }
        self.hospital_assigned = Some(hospital);
        self.route = Some(route);
        Ok(())
    }

    /// idle → relocating.
    pub fn relocate(&mut self, route: RouteCursor) -> WorldResult<()> {
        if self.status != AmbulanceStatus::Idle || self.emergency_assigned.is_some() {
            return Err(self.illegal(AmbulanceStatus::Relocating));
        }
        self.status = AmbulanceStatus::Relocating;
        self.route = Some(route);
        Ok(())
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Travel for `elapsed_min` minutes along the current route.
    ///
    /// Returns `None` if there is no route.  When the route is used up the
    /// cursor is dropped, leaving the remaining route empty; the caller is
    /// responsible for firing the arrival transition.
    pub fn advance(&mut self, elapsed_min: f64) -> Option<Advance> {
        let cursor = self.route.as_mut()?;
        let step = cursor.advance(elapsed_min);
        self.position = step.position;
        if step.finished {
            self.route = None;
        }
        Some(step)
    }

    /// en_route_to_emergency → at_emergency, patient on board.
    pub fn arrive_at_emergency(&mut self) -> WorldResult<EmergencyId> {
        match (self.status, self.emergency_assigned, &self.route) {
            (AmbulanceStatus::EnRouteToEmergency, Some(em), None) => {
                self.status = AmbulanceStatus::AtEmergency;
                self.contains_patient = true;
                Ok(em)
            }
            _ => Err(self.illegal(AmbulanceStatus::AtEmergency)),
        }
    }

    /// en_route_to_hospital → idle, patient handed over, assignments cleared.
    pub fn hand_over_patient(&mut self) -> WorldResult<(EmergencyId, HospitalId)> {
        match (self.status, self.emergency_assigned, self.hospital_assigned, &self.route) {
            (AmbulanceStatus::EnRouteToHospital, Some(em), Some(h), None) => {
                self.status = AmbulanceStatus::Idle;
                self.contains_patient = false;
                self.emergency_assigned = None;
                self.hospital_assigned = None;
                Ok((em, h))
            }
            _ => Err(self.illegal(AmbulanceStatus::Idle)),
        }
    }

    /// relocating → idle.
    pub fn finish_relocation(&mut self) -> WorldResult<()> {
        if self.status != AmbulanceStatus::Relocating || self.route.is_some() {
            return Err(self.illegal(AmbulanceStatus::Idle));
        }
        self.status = AmbulanceStatus::Idle;
        Ok(())
    }
}

// ── Emergency ─────────────────────────────────────────────────────────────────

/// A call from the scenario.
///
/// `resolved` is derived from the status, so `resolved ⇔ finished` holds by
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Emergency {
    id:                     EmergencyId,
    timestamp:              NaiveDateTime,
    location:               GeoPoint,
    hospitals:              Vec<HospitalId>,
    status:                 EmergencyStatus,
    ambulance_arrival_time: Option<NaiveDateTime>,
    hospital_arrival_time:  Option<NaiveDateTime>,
}

impl Emergency {
    pub fn new(
        id:        EmergencyId,
        timestamp: NaiveDateTime,
        location:  GeoPoint,
        hospitals: Vec<HospitalId>,
    ) -> Self {
        Self {
            id,
            timestamp,
            location,
            hospitals,
            status: EmergencyStatus::WaitingForAssignment,
            ambulance_arrival_time: None,
            hospital_arrival_time: None,
        }
    }

    #[inline]
    pub fn id(&self) -> EmergencyId {
        self.id
    }

    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Hospitals eligible to receive this patient.
    #[inline]
    pub fn hospitals(&self) -> &[HospitalId] {
        &self.hospitals
    }

    #[inline]
    pub fn status(&self) -> EmergencyStatus {
        self.status
    }

    #[inline]
    pub fn resolved(&self) -> bool {
        self.status == EmergencyStatus::Finished
    }

    #[inline]
    pub fn ambulance_arrival_time(&self) -> Option<NaiveDateTime> {
        self.ambulance_arrival_time
    }

    #[inline]
    pub fn hospital_arrival_time(&self) -> Option<NaiveDateTime> {
        self.hospital_arrival_time
    }

    fn illegal(&self, to: EmergencyStatus) -> WorldError {
        WorldError::IllegalTransition {
            entity: self.id.to_string(),
            from:   self.status.as_str(),
            to:     to.as_str(),
        }
    }

    /// waiting_for_assignment → waiting_for_ambulance.
    pub fn assign(&mut self) -> WorldResult<()> {
        if self.status != EmergencyStatus::WaitingForAssignment {
            return Err(self.illegal(EmergencyStatus::WaitingForAmbulance));
        }
        self.status = EmergencyStatus::WaitingForAmbulance;
        Ok(())
    }

    /// Stamp the ambulance arrival; status stays waiting_for_ambulance until
    /// the patient is driven off.
    pub fn record_ambulance_arrival(&mut self, at: NaiveDateTime) -> WorldResult<()> {
        if self.status != EmergencyStatus::WaitingForAmbulance || self.ambulance_arrival_time.is_some() {
            return Err(self.illegal(EmergencyStatus::WaitingForAmbulance));
        }
        self.ambulance_arrival_time = Some(at);
        Ok(())
    }

    /// waiting_for_ambulance (ambulance on scene) → en_route_to_hospital.
    pub fn depart_to_hospital(&mut self) -> WorldResult<()> {
        if self.status != EmergencyStatus::WaitingForAmbulance || self.ambulance_arrival_time.is_none() {
            return Err(self.illegal(EmergencyStatus::EnRouteToHospital));
        }
        self.status = EmergencyStatus::EnRouteToHospital;
        Ok(())
    }

    /// en_route_to_hospital → finished.
    pub fn finish(&mut self, at: NaiveDateTime) -> WorldResult<()> {
        if self.status != EmergencyStatus::EnRouteToHospital {
            return Err(self.illegal(EmergencyStatus::Finished));
        }
        self.status = EmergencyStatus::Finished;
        self.hospital_arrival_time = Some(at);
        Ok(())
    }
}

// ── Hospital ──────────────────────────────────────────────────────────────────

/// A destination with finite admission capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Hospital {
    id:        HospitalId,
    location:  GeoPoint,
    free_beds: u32,
}

impl Hospital {
    pub fn new(id: HospitalId, location: GeoPoint, free_beds: u32) -> Self {
        Self { id, location, free_beds }
    }

    #[inline]
    pub fn id(&self) -> HospitalId {
        self.id
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    #[inline]
    pub fn free_beds(&self) -> u32 {
        self.free_beds
    }

    #[inline]
    pub fn has_free_bed(&self) -> bool {
        self.free_beds > 0
    }

    /// Take one bed.  A full hospital is an invariant violation, never a
    /// silent clamp.
    pub fn admit(&mut self) -> WorldResult<u32> {
        self.free_beds = self
            .free_beds
            .checked_sub(1)
            .ok_or(WorldError::NoFreeBeds(self.id))?;
        Ok(self.free_beds)
    }
}

// ── Static markers ────────────────────────────────────────────────────────────

/// A base ambulances may relocate to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RescueStation {
    pub id:       StationId,
    pub location: GeoPoint,
}

/// An area whose coverage a policy may try to maintain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeyZone {
    pub id:       ZoneId,
    pub location: GeoPoint,
}
