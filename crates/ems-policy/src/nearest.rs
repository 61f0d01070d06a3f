//! Greedy nearest-first dispatch with key-zone coverage relocation.
//!
//! Each tick, in this order:
//!
//! 1. every call waiting for assignment gets the available ambulance with the
//!    shortest travel time (an ambulance is promised to at most one call per
//!    tick);
//! 2. every ambulance that has picked up a patient and has no hospital is sent
//!    to the nearest eligible hospital with an open bed, or to the nearest
//!    hospital of any kind with an open bed; with no open bed anywhere it
//!    waits at the scene;
//! 3. with probability `random_relocation_prob`, each idle ambulance moves to
//!    a random hospital or rescue station;
//! 4. the first key zone with no ambulance within `coverage_threshold_min`
//!    pulls the idle ambulance nearest to it toward the hospital or station
//!    nearest that zone;
//! 5. ambulances driving to a hospital that has filled up are retargeted to
//!    the nearest hospital that still has an open bed.
//!
//! A bed is open when it is free and not already promised to an ambulance
//! driving a patient there, so two patients are never sent to one last bed.

use std::collections::HashMap;

use ems_core::{Decision, GeoPoint, HospitalId, SimRng};
use ems_world::{Ambulance, AmbulanceStatus, EmergencyStatus, Hospital};

use crate::{DecisionBatch, DispatchPolicy, PolicyContext, PolicyError, PolicyResult};

/// Default coverage target, in minutes of travel.
pub const DEFAULT_COVERAGE_THRESHOLD_MIN: f64 = 10.0;

/// Positions closer than this are treated as the same place.
const SAME_PLACE_M: f64 = 1.0;

pub struct NearestAvailablePolicy {
    coverage_threshold_min: f64,
    random_relocation_prob: f64,
    rng:                    SimRng,
}

impl NearestAvailablePolicy {
    /// Coverage threshold 10 minutes, no random relocation.
    pub fn new(seed: u64) -> Self {
        Self {
            coverage_threshold_min: DEFAULT_COVERAGE_THRESHOLD_MIN,
            random_relocation_prob: 0.0,
            rng:                    SimRng::new(seed),
        }
    }

    /// Override the coverage target.  `f64::INFINITY` disables coverage
    /// relocation.
    pub fn with_coverage_threshold(mut self, minutes: f64) -> PolicyResult<Self> {
        if minutes.is_nan() || minutes < 0.0 {
            return Err(PolicyError::Config(format!(
                "coverage threshold must be a non-negative number of minutes, got {minutes}"
            )));
        }
        self.coverage_threshold_min = minutes;
        Ok(self)
    }

    pub fn with_random_relocation(mut self, probability: f64) -> PolicyResult<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PolicyError::Config(format!(
                "relocation probability must be in [0, 1], got {probability}"
            )));
        }
        self.random_relocation_prob = probability;
        Ok(self)
    }

    #[inline]
    pub fn coverage_threshold_min(&self) -> f64 {
        self.coverage_threshold_min
    }

    // ── Steps ─────────────────────────────────────────────────────────────

    fn dispatch_waiting_calls(&self, ctx: &PolicyContext<'_>, batch: &mut DecisionBatch) {
        for call in ctx.state.working_emergencies() {
            if call.status() != EmergencyStatus::WaitingForAssignment {
                continue;
            }
            let candidates = ctx
                .state
                .ambulances()
                .iter()
                .filter(|a| a.is_available() && !batch.is_claimed(a.id()));
            if let Some(amb) = nearest(candidates, |a: &Ambulance| ctx.travel_minutes(a.position(), call.location())) {
                batch.push(Decision::SendAmbulanceToEmergency { ambulance: amb.id(), emergency: call.id() });
            }
        }
    }

    fn send_loaded_to_hospital(&self, ctx: &PolicyContext<'_>, beds: &mut OpenBeds, batch: &mut DecisionBatch) {
        let hospitals = ctx.state.hospitals();
        for amb in ctx.state.ambulances() {
            if !awaiting_hospital(amb) || batch.is_claimed(amb.id()) {
                continue;
            }
            let Some(call) = amb.emergency_assigned().and_then(|id| ctx.state.emergency(id)) else {
                continue;
            };
            let from = amb.position();
            let eligible = hospitals
                .iter()
                .filter(|h| call.hospitals().contains(&h.id()) && beds.is_open(h.id()));
            let chosen = nearest(eligible, |h: &Hospital| ctx.travel_minutes(from, h.location())).or_else(|| {
                let open = hospitals.iter().filter(|h| beds.is_open(h.id()));
                nearest(open, |h: &Hospital| ctx.travel_minutes(from, h.location()))
            });
            match chosen {
                Some(h) => {
                    beds.promise(h.id());
                    batch.push(Decision::SendAmbulanceToHospital { ambulance: amb.id(), hospital: h.id() });
                }
                None => tracing::debug!(ambulance = %amb.id(), "no open bed, holding at scene"),
            }
        }
    }

    fn random_relocations(&mut self, ctx: &PolicyContext<'_>, batch: &mut DecisionBatch) {
        if self.random_relocation_prob <= 0.0 {
            return;
        }
        let destinations = relocation_destinations(ctx);
        for amb in ctx.state.ambulances() {
            if !is_idle(amb) || batch.is_claimed(amb.id()) {
                continue;
            }
            if self.rng.gen_bool(self.random_relocation_prob) {
                if let Some(&target) = self.rng.choose(&destinations) {
                    batch.push(Decision::RelocateAmbulance { ambulance: amb.id(), target });
                }
            }
        }
    }

    fn cover_key_zones(&self, ctx: &PolicyContext<'_>, batch: &mut DecisionBatch) {
        let ambulances = ctx.state.ambulances();
        let uncovered = ctx.state.key_zones().iter().find(|zone| {
            let coverage = ambulances
                .iter()
                .filter(|a| a.status() != AmbulanceStatus::Broken)
                .map(|a| ctx.travel_minutes(heading(a), zone.location))
                .fold(f64::INFINITY, f64::min);
            coverage > self.coverage_threshold_min
        });
        let Some(zone) = uncovered else { return };

        let idle = ambulances.iter().filter(|a| is_idle(a) && !batch.is_claimed(a.id()));
        let Some(amb) = nearest(idle, |a: &Ambulance| ctx.travel_minutes(a.position(), zone.location)) else {
            return;
        };
        let destinations = relocation_destinations(ctx);
        let Some(&target) = nearest(destinations.iter(), |&d: &GeoPoint| ctx.travel_minutes(zone.location, d)) else {
            return;
        };
        if amb.position().distance_m(target) < SAME_PLACE_M {
            return;
        }
        tracing::debug!(zone = %zone.id, ambulance = %amb.id(), %target, "relocating to cover key zone");
        batch.push(Decision::RelocateAmbulance { ambulance: amb.id(), target });
    }

    fn retarget_full_hospitals(&self, ctx: &PolicyContext<'_>, beds: &mut OpenBeds, batch: &mut DecisionBatch) {
        let hospitals = ctx.state.hospitals();
        for amb in ctx.state.ambulances() {
            if amb.status() != AmbulanceStatus::EnRouteToHospital || batch.is_claimed(amb.id()) {
                continue;
            }
            let full = amb
                .hospital_assigned()
                .and_then(|id| ctx.state.hospital(id))
                .is_some_and(|h| !h.has_free_bed());
            if !full {
                continue;
            }
            let from = amb.position();
            let open = hospitals.iter().filter(|h| beds.is_open(h.id()));
            if let Some(h) = nearest(open, |h: &Hospital| ctx.travel_minutes(from, h.location())) {
                beds.promise(h.id());
                batch.push(Decision::ChangeTargetHospital { ambulance: amb.id(), hospital: h.id() });
            }
        }
    }
}

impl DispatchPolicy for NearestAvailablePolicy {
    fn decide(&mut self, ctx: &PolicyContext<'_>) -> Vec<Decision> {
        let mut batch = DecisionBatch::new();
        let mut beds = OpenBeds::new(ctx);
        self.dispatch_waiting_calls(ctx, &mut batch);
        self.send_loaded_to_hospital(ctx, &mut beds, &mut batch);
        self.random_relocations(ctx, &mut batch);
        self.cover_key_zones(ctx, &mut batch);
        self.retarget_full_hospitals(ctx, &mut beds, &mut batch);
        batch.into_decisions()
    }

    fn name(&self) -> &str {
        "nearest_available"
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The element with the smallest finite travel time; the first one on ties.
pub(crate) fn nearest<'a, T: 'a>(
    items:   impl Iterator<Item = &'a T>,
    minutes: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    items
        .map(|item| (item, minutes(item)))
        .filter(|(_, t)| t.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _)| item)
}

/// Free beds per hospital minus those already promised to an inbound
/// ambulance.  Counts go negative when a hospital is over-committed.
pub(crate) struct OpenBeds(HashMap<HospitalId, i64>);

impl OpenBeds {
    pub(crate) fn new(ctx: &PolicyContext<'_>) -> Self {
        let mut beds: HashMap<HospitalId, i64> =
            ctx.state.hospitals().iter().map(|h| (h.id(), i64::from(h.free_beds()))).collect();
        for amb in ctx.state.ambulances() {
            if amb.status() != AmbulanceStatus::EnRouteToHospital {
                continue;
            }
            if let Some(n) = amb.hospital_assigned().and_then(|id| beds.get_mut(&id)) {
                *n -= 1;
            }
        }
        Self(beds)
    }

    pub(crate) fn is_open(&self, hospital: HospitalId) -> bool {
        self.0.get(&hospital).is_some_and(|&n| n > 0)
    }

    pub(crate) fn promise(&mut self, hospital: HospitalId) {
        if let Some(n) = self.0.get_mut(&hospital) {
            *n -= 1;
        }
    }
}

/// Patient on board, no hospital chosen yet, standing still.
pub(crate) fn awaiting_hospital(amb: &Ambulance) -> bool {
    amb.emergency_assigned().is_some()
        && amb.hospital_assigned().is_none()
        && amb.contains_patient()
        && !amb.has_route()
}

fn is_idle(amb: &Ambulance) -> bool {
    amb.status() == AmbulanceStatus::Idle && amb.emergency_assigned().is_none()
}

/// Where an ambulance will be once it settles: a relocating ambulance counts
/// as already covering the area around its destination.
fn heading(amb: &Ambulance) -> GeoPoint {
    match (amb.status(), amb.route()) {
        (AmbulanceStatus::Relocating, Some(cursor)) => cursor.destination(),
        _ => amb.position(),
    }
}

/// Hospitals first, then rescue stations.
pub(crate) fn relocation_destinations(ctx: &PolicyContext<'_>) -> Vec<GeoPoint> {
    ctx.state
        .hospitals()
        .iter()
        .map(Hospital::location)
        .chain(ctx.state.rescue_stations().iter().map(|s| s.location))
        .collect()
}
