//! `ems-route` — routes, route cursors and travel-time estimation.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`route`]   | `Waypoint`, `Route` (validated), `RouteCursor`, `Advance`       |
//! | [`router`]  | `Router` trait, `LinearRouter`, `MaxRangeRouter`, `compute_route_linear_interpolation` |
//! | [`error`]   | `RouteError`, `RouteResult<T>`                                  |
//!
//! # Units
//!
//! Offsets and travel times are **minutes** (`f64`).  An unreachable
//! destination is an empty `Route` whose `total_minutes()` is infinite; it
//! is never an error.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Waypoint` and `Route`. |

pub mod error;
pub mod route;
pub mod router;


pub use error::{RouteError, RouteResult};
pub use route::{Advance, OFFSET_EPSILON, Route, RouteCursor, Waypoint};
pub use router::{
    DEFAULT_SPEED_KMH, LinearRouter, MAX_ROUTE_MINUTES, MaxRangeRouter, Router,
    compute_route_linear_interpolation,
};
