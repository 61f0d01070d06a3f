//! Routing trait and the deterministic linear-interpolation fallback.
//!
//! # Pluggability
//!
//! The dispatch validator and every policy call routing through the
//! [`Router`] trait, so a harness can swap in a road-network router without
//! touching the engine.  [`LinearRouter`] is the fallback: straight-line
//! displacement at a constant speed, which always yields a finite route for
//! finite endpoints.
//!
//! # Purity
//!
//! `route` takes `&self` and must not depend on hidden state or randomness.
//! Policies call it speculatively for every candidate ambulance, and the
//! validator calls it again when a decision is applied; both must see the
//! same answer.

use ems_core::GeoPoint;

use crate::route::{Route, Waypoint};

/// Assumed ambulance speed when no road network is available.
pub const DEFAULT_SPEED_KMH: f64 = 40.0;

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable travel-time estimator.
///
/// Implementations must be `Send + Sync` so a policy may evaluate candidates
/// on several threads.
pub trait Router: Send + Sync {
    /// Compute a time-annotated route from `from` to `to`.
    ///
    /// The result starts at offset 0, strictly increases, and ends exactly at
    /// `to`.  An empty route means `to` is unreachable.
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route;

    /// Travel time in minutes; `f64::INFINITY` when unreachable.
    fn travel_minutes(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        self.route(from, to).total_minutes()
    }
}

impl<R: Router + ?Sized> Router for &R {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
        (**self).route(from, to)
    }

    fn travel_minutes(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        (**self).travel_minutes(from, to)
    }
}

// ── LinearRouter ──────────────────────────────────────────────────────────────

/// Straight-line routing at a fixed speed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearRouter {
    pub speed_kmh: f64,
}

impl LinearRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl Default for LinearRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

impl Router for LinearRouter {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
        compute_route_linear_interpolation(from, to, self.speed_kmh)
    }
}

/// Longest linear route, in minutes.  Anything slower is unreachable.
pub const MAX_ROUTE_MINUTES: f64 = 100_000.0;

#[inline]
fn metres_per_minute(speed_kmh: f64) -> f64 {
    speed_kmh * 1000.0 / 60.0
}

/// Linearly interpolate from `from` to `to` at `speed_kmh`.
///
/// Emits one waypoint at every whole minute strictly before arrival (the
/// first at offset 0, at `from`) plus a final waypoint exactly at `to` with
/// the fractional total as its offset.  When `from == to` the route is the
/// single waypoint `(0, to)`.  Non-finite endpoints, a non-positive speed or
/// a trip longer than [`MAX_ROUTE_MINUTES`] produce an empty (unreachable)
/// route.
pub fn compute_route_linear_interpolation(from: GeoPoint, to: GeoPoint, speed_kmh: f64) -> Route {
    if !from.is_finite() || !to.is_finite() || !(speed_kmh.is_finite() && speed_kmh > 0.0) {
        return Route::empty();
    }

    let total = from.distance_m(to) / metres_per_minute(speed_kmh);
    if !(total.is_finite() && total <= MAX_ROUTE_MINUTES) {
        return Route::empty();
    }
    let mut waypoints = Vec::with_capacity(total.ceil() as usize + 1);

    let mut minute = 0u64;
    while (minute as f64) < total {
        let offset = minute as f64;
        waypoints.push(Waypoint::new(offset, from.lerp(to, offset / total)));
        minute += 1;
    }
    waypoints.push(Waypoint::new(total, to));

    Route::from_sorted(waypoints)
}

// ── MaxRangeRouter ────────────────────────────────────────────────────────────

/// Wraps another router and treats any destination farther than
/// `max_minutes` as unreachable.
///
/// Models service-area limits (bridges, county lines) on top of a
/// distance-only estimator.
#[derive(Clone, Debug)]
pub struct MaxRangeRouter<R: Router> {
    pub inner:       R,
    pub max_minutes: f64,
}

impl<R: Router> MaxRangeRouter<R> {
    pub fn new(inner: R, max_minutes: f64) -> Self {
        Self { inner, max_minutes }
    }
}

impl<R: Router> Router for MaxRangeRouter<R> {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
        let route = self.inner.route(from, to);
        if route.total_minutes() > self.max_minutes {
            Route::empty()
        } else {
            route
        }
    }
}
