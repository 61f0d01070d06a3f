//! Route-construction error type.

use thiserror::Error;

/// A waypoint list that breaks the route invariants.
///
/// Every variant is an invariant violation: routers must never produce one,
/// so callers treat it as fatal rather than as an unreachable destination.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("waypoint {index} has a non-finite offset or position")]
    NonFinite { index: usize },

    #[error("waypoint {index} has negative offset {offset}")]
    NegativeOffset { index: usize, offset: f64 },

    #[error("waypoint offsets must strictly increase: waypoint {index} has {next} after {previous}")]
    NonIncreasingOffsets {
        index:    usize,
        previous: f64,
        next:     f64,
    },
}

pub type RouteResult<T> = Result<T, RouteError>;
