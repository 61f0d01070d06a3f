//! Strongly typed, zero-cost identifier wrappers.
//!
//! Ids come straight from the map and scenario files, so they are opaque
//! keys rather than vector indices.  Every collection in the world model
//! resolves them through an explicit id → entity lookup table.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw id as it appears in input files.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of an ambulance in the static roster.
    pub struct AmbulanceId(u32);
}

typed_id! {
    /// Identifier of an emergency call in a scenario.
    pub struct EmergencyId(u32);
}

typed_id! {
    /// Identifier of a hospital in the static roster.
    pub struct HospitalId(u32);
}

typed_id! {
    /// Identifier of a rescue station (relocation target).
    pub struct StationId(u32);
}

typed_id! {
    /// Identifier of a key zone used for coverage evaluation.
    pub struct ZoneId(u32);
}
