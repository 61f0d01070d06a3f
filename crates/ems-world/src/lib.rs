//! `ems-world` — the world model: entities, simulation state and loaders.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`entity`]    | `Ambulance`, `Emergency`, `Hospital`, `RescueStation`, `KeyZone`, statuses |
//! | [`state`]     | `SimulationState` (owns everything), `Roster`                 |
//! | [`pending`]   | `PendingQueue` — future calls keyed by timestamp              |
//! | [`builder`]   | `StateBuilder` (fluent construction)                          |
//! | [`loader`]    | JSON map and scenario loaders                                 |
//! | [`event`]     | `SimEvent`, `IgnoreReason`, `EventSink`                       |
//! | [`error`]     | `WorldError`, `WorldResult`                                   |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on status enums.         |
//! | `fx-hash` | Uses `FxHashMap` for id lookup tables.                     |

pub mod builder;
pub mod entity;
pub mod error;
pub mod event;
pub mod loader;
pub mod pending;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::StateBuilder;
pub use entity::{
    Ambulance, AmbulanceStatus, Emergency, EmergencyStatus, Hospital, KeyZone, RescueStation,
};
pub use error::{WorldError, WorldResult};
pub use event::{EventSink, IgnoreReason, LoggedEvent, NullSink, SimEvent};
pub use loader::{load_map_path, load_map_reader, load_scenario_path, load_scenario_reader};
pub use pending::PendingQueue;
pub use state::{Roster, SimulationState};
