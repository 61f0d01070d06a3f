//! A no-op policy — never decides anything.

use ems_core::Decision;

use crate::{DispatchPolicy, PolicyContext};

/// A [`DispatchPolicy`] that always returns an empty decision list.
///
/// Useful in tests, or to measure how a scenario plays out with no response
/// at all (every call stays unresolved until the tick cap).
pub struct NoopPolicy;

impl DispatchPolicy for NoopPolicy {
    fn decide(&mut self, _ctx: &PolicyContext<'_>) -> Vec<Decision> {
        vec![]
    }

    fn name(&self) -> &str {
        "noop"
    }
}
