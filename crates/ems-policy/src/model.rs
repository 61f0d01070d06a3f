//! The `DispatchPolicy` trait — the main extension point for user code.

use ems_core::Decision;

use crate::PolicyContext;

/// Pluggable dispatch strategy.
///
/// Called exactly once per tick, after newly due calls have been activated.
/// The returned decisions are applied strictly in order; any that are
/// illegal against the current state are ignored and logged, so a policy
/// never has to be correct for the simulation to stay consistent.
///
/// Policies may keep private state between ticks (`&mut self`), including a
/// seeded [`SimRng`][ems_core::SimRng].  They must not rely on wall-clock
/// time or thread-local randomness if runs are to be reproducible.
///
/// # Example
///
/// ```rust,ignore
/// struct FirstIdle;
///
/// impl DispatchPolicy for FirstIdle {
///     fn decide(&mut self, ctx: &PolicyContext<'_>) -> Vec<Decision> {
///         let Some(call) = ctx.state.working_emergencies()
///             .find(|e| e.status() == EmergencyStatus::WaitingForAssignment) else { return vec![] };
///         ctx.state.ambulances().iter()
///             .find(|a| a.is_available())
///             .map(|a| Decision::SendAmbulanceToEmergency { ambulance: a.id(), emergency: call.id() })
///             .into_iter()
///             .collect()
///     }
/// }
/// ```
pub trait DispatchPolicy: Send {
    /// Decide what to do this tick.  An empty `Vec` means "do nothing".
    fn decide(&mut self, ctx: &PolicyContext<'_>) -> Vec<Decision>;

    /// Short label used in logs and output metadata.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<P: DispatchPolicy + ?Sized> DispatchPolicy for Box<P> {
    fn decide(&mut self, ctx: &PolicyContext<'_>) -> Vec<Decision> {
        (**self).decide(ctx)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
