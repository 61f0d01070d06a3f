//! `ems-core` — foundational types for the EMS dispatch simulator.
//!
//! This crate is a dependency of every other `ems-*` crate.  It has no
//! `ems-*` dependencies and few external ones (`chrono`, `rand`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`decision`]    | `Decision` — tagged policy actions                         |
//! | [`ids`]         | `AmbulanceId`, `EmergencyId`, `HospitalId`, `StationId`, `ZoneId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, interpolation              |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`, timestamp parsing         |
//! | [`rng`]         | `SimRng` (seeded, policy-side only)                        |
//! | [`error`]       | `EmsError`, `EmsResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod decision;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use chrono::NaiveDateTime;

pub use decision::Decision;
pub use error::{EmsError, EmsResult};
pub use geo::GeoPoint;
pub use ids::{AmbulanceId, EmergencyId, HospitalId, StationId, ZoneId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick, format_timestamp, minutes_between, parse_timestamp};
