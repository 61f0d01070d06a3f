//! `ems-motion` — ambulance movement along routes and arrival transitions.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`engine`] | `move_ambulances_forward`, `Arrival`                      |
//! | [`error`]  | `MotionError`, `MotionResult<T>`                          |
//!
//! # Movement model
//!
//! Each ambulance with a route follows it waypoint by waypoint; waypoint
//! offsets are minutes relative to the moment the route was assigned.  One
//! call to [`move_ambulances_forward`] runs in two phases:
//!
//! 1. every cursor advances by the elapsed minutes (in parallel with the
//!    `parallel` feature), landing exactly on the last waypoint it passed;
//! 2. ambulances whose route ran out fire their arrival transition in roster
//!    order, so the result is independent of the thread count.
//!
//! Arrivals:
//!
//! | Status before            | After   | Side effects                                  |
//! |--------------------------|---------|-----------------------------------------------|
//! | `en_route_to_emergency`  | `at_emergency` | patient on board, call arrival time set |
//! | `en_route_to_hospital`   | `idle`  | bed taken, call finished and archived          |
//! | `relocating`             | `idle`  | none                                           |

pub mod engine;
pub mod error;

#[cfg(test)]
mod tests;

pub use engine::{Arrival, move_ambulances_forward};
pub use error::{MotionError, MotionResult};
