use ems_core::{AmbulanceId, HospitalId};
use ems_world::WorldError;
use thiserror::Error;

/// Invariant violations detected while moving ambulances.  Any of these
/// aborts the run.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("{ambulance} arrived at {hospital}, which has no free beds")]
    HospitalFull {
        ambulance: AmbulanceId,
        hospital:  HospitalId,
    },

    #[error("{ambulance} arrived holding a dangling {kind} reference {id}")]
    DanglingReference {
        ambulance: AmbulanceId,
        kind:      &'static str,
        id:        u32,
    },

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type MotionResult<T> = Result<T, MotionError>;
