//! The motion step: advance every route, then fire arrival transitions.

use ems_core::{AmbulanceId, EmergencyId, GeoPoint, HospitalId, NaiveDateTime, minutes_between};
use ems_world::{Ambulance, AmbulanceStatus, EventSink, SimEvent, SimulationState, WorldError};

use crate::{MotionError, MotionResult};

/// An arrival fired during one motion step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Arrival {
    /// Reached the scene; the patient is now on board.
    AtEmergency {
        ambulance: AmbulanceId,
        emergency: EmergencyId,
    },
    /// Handed the patient over; the call is resolved and archived.
    AtHospital {
        ambulance: AmbulanceId,
        hospital:  HospitalId,
        emergency: EmergencyId,
    },
    /// Finished a relocation and is idle again.
    Relocated {
        ambulance: AmbulanceId,
        position:  GeoPoint,
    },
}

impl Arrival {
    pub fn ambulance(&self) -> AmbulanceId {
        match *self {
            Arrival::AtEmergency { ambulance, .. }
            | Arrival::AtHospital { ambulance, .. }
            | Arrival::Relocated { ambulance, .. } => ambulance,
        }
    }
}

/// Move every ambulance `elapsed_min` minutes along its route.
///
/// Ambulances whose route runs out this step get their arrival transition,
/// applied in roster order at the current clock.  Each arrival is written to
/// `sink`.  Hospital beds, emergency timestamps and the working → archived
/// move are all updated here.
///
/// # Errors
///
/// Only invariant violations: an arrival at a hospital with no free bed, or
/// an ambulance referencing an emergency or hospital that does not exist.
pub fn move_ambulances_forward(
    state:       &mut SimulationState,
    elapsed_min: f64,
    sink:        &mut dyn EventSink,
) -> MotionResult<Vec<Arrival>> {
    let finished = advance_routes(state.ambulances_mut(), elapsed_min);
    let now = state.now();

    let mut arrivals = Vec::with_capacity(finished.len());
    for slot in finished {
        let arrival = arrive(state, slot, now, sink)?;
        tracing::debug!(?arrival, "arrival");
        arrivals.push(arrival);
    }
    Ok(arrivals)
}

// ── Phase 1: route advancement ────────────────────────────────────────────────

/// Advance all routes and return the roster slots whose route just ended,
/// in roster order.
fn advance_routes(ambulances: &mut [Ambulance], elapsed_min: f64) -> Vec<usize> {
    #[cfg(not(feature = "parallel"))]
    {
        ambulances
            .iter_mut()
            .enumerate()
            .filter_map(|(i, amb)| amb.advance(elapsed_min).filter(|s| s.finished).map(|_| i))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        // Each ambulance owns its cursor, so the advancement is data-parallel.
        // `collect` on an indexed iterator keeps roster order.
        ambulances
            .par_iter_mut()
            .enumerate()
            .filter_map(|(i, amb)| amb.advance(elapsed_min).filter(|s| s.finished).map(|_| i))
            .collect()
    }
}

// ── Phase 2: arrival transitions ──────────────────────────────────────────────

fn arrive(
    state: &mut SimulationState,
    slot:  usize,
    now:   NaiveDateTime,
    sink:  &mut dyn EventSink,
) -> MotionResult<Arrival> {
    let amb = &state.ambulances()[slot];
    let ambulance = amb.id();

    match amb.status() {
        AmbulanceStatus::EnRouteToEmergency => {
            if let Some(id) = amb.emergency_assigned().filter(|&id| state.emergency(id).is_none()) {
                return Err(dangling(ambulance, "emergency", id.raw()));
            }

            let emergency = state.ambulances_mut()[slot].arrive_at_emergency()?;
            if let Some(call) = state.emergency_mut(emergency) {
                call.record_ambulance_arrival(now)?;
            }
            sink.record(now, &SimEvent::ArrivedAtEmergency { ambulance, emergency });
            Ok(Arrival::AtEmergency { ambulance, emergency })
        }

        AmbulanceStatus::EnRouteToHospital => {
            let (Some(emergency), Some(hospital)) = (amb.emergency_assigned(), amb.hospital_assigned()) else {
                return Err(cannot_arrive(ambulance, AmbulanceStatus::EnRouteToHospital));
            };

            // Check every reference before the first mutation.
            let has_bed = state
                .hospital(hospital)
                .ok_or_else(|| dangling(ambulance, "hospital", hospital.raw()))?
                .has_free_bed();
            if !has_bed {
                return Err(MotionError::HospitalFull { ambulance, hospital });
            }
            let called_at = state
                .emergency(emergency)
                .ok_or_else(|| dangling(ambulance, "emergency", emergency.raw()))?
                .timestamp();

            state.ambulances_mut()[slot].hand_over_patient()?;
            let free_beds_left = match state.hospital_mut(hospital) {
                Some(h) => h.admit()?,
                None => return Err(dangling(ambulance, "hospital", hospital.raw())),
            };
            if let Some(call) = state.emergency_mut(emergency) {
                call.finish(now)?;
            }
            state.archive_emergency(emergency)?;

            sink.record(now, &SimEvent::ArrivedAtHospital { ambulance, hospital, free_beds_left });
            sink.record(now, &SimEvent::EmergencyResolved {
                emergency,
                total_wait_min: minutes_between(called_at, now),
            });
            Ok(Arrival::AtHospital { ambulance, hospital, emergency })
        }

        AmbulanceStatus::Relocating => {
            let position = amb.position();
            state.ambulances_mut()[slot].finish_relocation()?;
            sink.record(now, &SimEvent::RelocationFinished { ambulance, position });
            Ok(Arrival::Relocated { ambulance, position })
        }

        // A finished route only exists for the three moving states.
        other => Err(cannot_arrive(ambulance, other)),
    }
}

fn cannot_arrive(ambulance: AmbulanceId, status: AmbulanceStatus) -> MotionError {
    MotionError::World(WorldError::IllegalTransition {
        entity: ambulance.to_string(),
        from:   status.as_str(),
        to:     "arrived",
    })
}

fn dangling(ambulance: AmbulanceId, kind: &'static str, id: u32) -> MotionError {
    MotionError::DanglingReference { ambulance, kind, id }
}
