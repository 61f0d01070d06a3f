//! Time-annotated routes and the cursor that consumes them.
//!
//! A [`Route`] is an immutable list of [`Waypoint`]s whose offsets (minutes
//! from the moment the route was planned) strictly increase.  Motion never
//! rewrites it: a [`RouteCursor`] records how many minutes have been
//! consumed, and offsets relative to "now" are derived on demand.  This keeps
//! the final waypoint bit-exact no matter how the journey is sliced into
//! steps.

use ems_core::GeoPoint;

use crate::{RouteError, RouteResult};

/// Slack applied when deciding whether a waypoint has been reached.
///
/// Step sizes are summed as `f64`; `1.0 + 1.0 + 0.7` need not equal a route
/// total computed by division.  Anything within this many minutes of the
/// consumed time counts as reached.
pub const OFFSET_EPSILON: f64 = 1e-9;

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// A `(time-offset, position)` pair on a planned route.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// Minutes after the route's reference instant.
    pub offset_min: f64,
    pub position:   GeoPoint,
}

impl Waypoint {
    #[inline]
    pub fn new(offset_min: f64, position: GeoPoint) -> Self {
        Self { offset_min, position }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered, strictly-increasing list of waypoints.
///
/// An empty route means "unreachable"; its travel time is infinite.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    /// Validate and wrap a waypoint list.
    pub fn new(waypoints: Vec<Waypoint>) -> RouteResult<Self> {
        let mut previous: Option<f64> = None;
        for (index, wp) in waypoints.iter().enumerate() {
            if !wp.offset_min.is_finite() || !wp.position.is_finite() {
                return Err(RouteError::NonFinite { index });
            }
            if wp.offset_min < 0.0 {
                return Err(RouteError::NegativeOffset { index, offset: wp.offset_min });
            }
            if let Some(prev) = previous {
                if wp.offset_min <= prev {
                    return Err(RouteError::NonIncreasingOffsets {
                        index,
                        previous: prev,
                        next: wp.offset_min,
                    });
                }
            }
            previous = Some(wp.offset_min);
        }
        Ok(Self { waypoints })
    }

    /// The unreachable route.
    pub fn empty() -> Self {
        Self { waypoints: Vec::new() }
    }

    /// Construct without validation.  Only for generators whose output is
    /// increasing by construction.
    pub(crate) fn from_sorted(waypoints: Vec<Waypoint>) -> Self {
        debug_assert!(Route::new(waypoints.clone()).is_ok());
        Self { waypoints }
    }

    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// `true` if the destination is unreachable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Offset of the last waypoint, or `f64::INFINITY` for an empty route.
    pub fn total_minutes(&self) -> f64 {
        self.waypoints.last().map_or(f64::INFINITY, |wp| wp.offset_min)
    }

    /// Position of the last waypoint.
    pub fn destination(&self) -> Option<GeoPoint> {
        self.waypoints.last().map(|wp| wp.position)
    }
}

// ── RouteCursor ───────────────────────────────────────────────────────────────

/// Result of advancing a [`RouteCursor`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Advance {
    /// Position after the step.
    pub position: GeoPoint,
    /// `true` once every waypoint has been consumed.
    pub finished: bool,
}

/// A consumption cursor over an immutable [`Route`].
///
/// Created when a route is assigned; the vehicle's position at that moment
/// is kept as the interpolation anchor for the first segment.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteCursor {
    route:    Route,
    origin:   GeoPoint,
    /// Index of the first unconsumed waypoint.
    next:     usize,
    /// Minutes consumed since the route was assigned.
    consumed: f64,
}

impl RouteCursor {
    /// Start following `route` from `origin`.  Returns `None` for an empty
    /// (unreachable) route.
    pub fn new(origin: GeoPoint, route: Route) -> Option<Self> {
        if route.is_empty() {
            return None;
        }
        Some(Self { route, origin, next: 0, consumed: 0.0 })
    }

    /// Consume `elapsed_min` minutes of travel.
    ///
    /// Waypoints whose offset has been reached are consumed; the returned
    /// position is the last consumed waypoint, or a linear interpolation
    /// toward the next one when the consumed time falls strictly between two
    /// offsets.  Once the final waypoint is reached the position is exactly
    /// that waypoint's.
    pub fn advance(&mut self, elapsed_min: f64) -> Advance {
        self.consumed += elapsed_min.max(0.0);

        let wps = self.route.waypoints();
        while self.next < wps.len() && wps[self.next].offset_min <= self.consumed + OFFSET_EPSILON {
            self.next += 1;
        }

        if self.next >= wps.len() {
            return Advance { position: wps[wps.len() - 1].position, finished: true };
        }

        let (anchor_offset, anchor) = match self.next {
            0 => (0.0, self.origin),
            i => (wps[i - 1].offset_min, wps[i - 1].position),
        };
        let target = wps[self.next];
        let span = target.offset_min - anchor_offset;
        let t = if span > 0.0 { ((self.consumed - anchor_offset) / span).clamp(0.0, 1.0) } else { 0.0 };

        Advance { position: anchor.lerp(target.position, t), finished: false }
    }

    /// `true` once every waypoint has been consumed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.next >= self.route.len()
    }

    /// Unconsumed waypoints with offsets relative to now.
    pub fn remaining(&self) -> impl Iterator<Item = Waypoint> + '_ {
        let consumed = self.consumed;
        self.route.waypoints()[self.next..]
            .iter()
            .map(move |wp| Waypoint::new(wp.offset_min - consumed, wp.position))
    }

    /// Number of unconsumed waypoints.
    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.route.len() - self.next
    }

    /// Minutes until the final waypoint (zero once finished).
    pub fn remaining_minutes(&self) -> f64 {
        (self.route.total_minutes() - self.consumed).max(0.0)
    }

    /// Final waypoint position.
    pub fn destination(&self) -> GeoPoint {
        // Non-empty by construction.
        self.route.waypoints()[self.route.len() - 1].position
    }

    /// The full route as planned.
    #[inline]
    pub fn route(&self) -> &Route {
        &self.route
    }
}
