use ems_core::{AmbulanceId, EmergencyId};
use ems_world::WorldError;
use thiserror::Error;

/// Invariant violations raised while applying a decision that already
/// passed validation.  Illegal decisions are never errors; they become
/// [`DecisionOutcome::Ignored`][crate::DecisionOutcome::Ignored].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0} vanished between validation and application")]
    DanglingAmbulance(AmbulanceId),

    #[error("{ambulance} carries {emergency}, which is not tracked")]
    DanglingEmergency {
        ambulance: AmbulanceId,
        emergency: EmergencyId,
    },

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
