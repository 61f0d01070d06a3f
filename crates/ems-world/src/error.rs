//! World-model error type.

use ems_core::{EmergencyId, EmsError, HospitalId};
use thiserror::Error;

/// Errors produced by `ems-world`.
///
/// The load-time variants (`Malformed`, `DuplicateId`, `UnknownReference`,
/// `Io`) are the MalformedInput class and always name their origin.  The
/// rest are invariant violations raised while the run is in progress.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("{origin}: malformed field `{field}`: {reason}")]
    Malformed {
        origin: String,
        field:  String,
        reason: String,
    },

    #[error("{origin}: duplicate {kind} id {id}")]
    DuplicateId {
        origin: String,
        kind:   &'static str,
        id:     u32,
    },

    #[error("{origin}: field `{field}` references unknown id {id}")]
    UnknownReference {
        origin: String,
        field:  String,
        id:     u32,
    },

    #[error("{origin}: I/O error: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal transition for {entity}: {from} -> {to}")]
    IllegalTransition {
        entity: String,
        from:   &'static str,
        to:     &'static str,
    },

    #[error("{0} has no free beds")]
    NoFreeBeds(HospitalId),

    #[error("{0} is not tracked")]
    UnknownEmergency(EmergencyId),

    #[error("{0} cannot be archived before it is resolved")]
    NotResolved(EmergencyId),

    #[error(transparent)]
    Core(#[from] EmsError),
}

impl WorldError {
    /// `true` for the load-time MalformedInput class.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            WorldError::Malformed { .. }
                | WorldError::DuplicateId { .. }
                | WorldError::UnknownReference { .. }
                | WorldError::Io { .. }
        )
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
