//! Fluent builder for constructing a [`Sim`].

use ems_core::SimConfig;
use ems_policy::DispatchPolicy;
use ems_route::{LinearRouter, Router};
use ems_world::SimulationState;

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<P, R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — tick length, tick cap, seed, speed
/// - [`SimulationState`] — a loaded map and scenario, see
///   [`ems_world::load_map_path`] or [`ems_world::StateBuilder`]
/// - `P: DispatchPolicy` — the decision policy
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                      |
/// |---------------|----------------------------------------------|
/// | `.router(r)`  | `LinearRouter::new(config.speed_kmh)`        |
///
/// # Example
///
/// ```rust,ignore
/// let mut state = load_map_path("map.json")?;
/// load_scenario_path(&mut state, "scenario.json")?;
/// let mut sim = SimBuilder::new(config, state, NearestAvailablePolicy::new(seed))
///     .build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P: DispatchPolicy, R: Router> {
    config: SimConfig,
    state:  SimulationState,
    policy: P,
    router: R,
}

impl<P: DispatchPolicy> SimBuilder<P, LinearRouter> {
    /// Create a builder with all required inputs and the linear router.
    pub fn new(config: SimConfig, state: SimulationState, policy: P) -> Self {
        let router = LinearRouter::new(config.speed_kmh);
        Self { config, state, policy, router }
    }
}

impl<P: DispatchPolicy, R: Router> SimBuilder<P, R> {
    /// Replace the travel-time estimator.
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<P, R2> {
        SimBuilder { config: self.config, state: self.state, policy: self.policy, router }
    }

    /// Validate the configuration and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<P, R>> {
        self.config.validate()?;
        Ok(Sim::new(self.config, self.state, self.policy, self.router))
    }
}
