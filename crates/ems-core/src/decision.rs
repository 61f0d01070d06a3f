//! The tagged decision vocabulary a dispatch policy may emit.
//!
//! Decisions are plain data: every variant names the ambulance it targets
//! plus the variant's payload.  Legality is judged later, against the state
//! at the moment the decision is applied.

use std::fmt;

use crate::{AmbulanceId, EmergencyId, GeoPoint, HospitalId};

/// One proposed action for one ambulance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// Send an available ambulance to a call waiting for assignment.
    SendAmbulanceToEmergency {
        ambulance: AmbulanceId,
        emergency: EmergencyId,
    },

    /// Drive a loaded ambulance to a hospital.
    SendAmbulanceToHospital {
        ambulance: AmbulanceId,
        hospital:  HospitalId,
    },

    /// Redirect an ambulance already driving to a hospital.
    ChangeTargetHospital {
        ambulance: AmbulanceId,
        hospital:  HospitalId,
    },

    /// Move an idle ambulance to a new standby position.
    RelocateAmbulance {
        ambulance: AmbulanceId,
        target:    GeoPoint,
    },
}

impl Decision {
    /// The ambulance every variant acts on.
    pub fn ambulance(&self) -> AmbulanceId {
        match *self {
            Decision::SendAmbulanceToEmergency { ambulance, .. }
            | Decision::SendAmbulanceToHospital { ambulance, .. }
            | Decision::ChangeTargetHospital { ambulance, .. }
            | Decision::RelocateAmbulance { ambulance, .. } => ambulance,
        }
    }

    /// Variant name, as written to event logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::SendAmbulanceToEmergency { .. } => "SendAmbulanceToEmergency",
            Decision::SendAmbulanceToHospital { .. }  => "SendAmbulanceToHospital",
            Decision::ChangeTargetHospital { .. }     => "ChangeTargetHospital",
            Decision::RelocateAmbulance { .. }        => "RelocateAmbulance",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::SendAmbulanceToEmergency { ambulance, emergency } => {
                write!(f, "{}(ambulance={}, emergency={})", self.kind(), ambulance.0, emergency.0)
            }
            Decision::SendAmbulanceToHospital { ambulance, hospital }
            | Decision::ChangeTargetHospital { ambulance, hospital } => {
                write!(f, "{}(ambulance={}, hospital={})", self.kind(), ambulance.0, hospital.0)
            }
            Decision::RelocateAmbulance { ambulance, target } => {
                write!(f, "{}(ambulance={}, target={})", self.kind(), ambulance.0, target)
            }
        }
    }
}
