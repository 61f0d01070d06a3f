//! `ems-dispatch` — validates policy decisions and applies the legal ones.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`apply`] | `apply_decisions`, `apply_decision`, `DecisionOutcome`, `ApplyReport` |
//! | [`error`] | `DispatchError`, `DispatchResult<T>`                      |
//!
//! # Legality
//!
//! Decisions are checked strictly in order against the state as left by the
//! previous one, so the first legal claim on an ambulance or call wins and
//! later conflicting decisions are ignored.  Checks run in two stages:
//! referenced ids must exist (an emergency counts only once activated), then
//! the entities must be in an eligible state.  The route is computed before
//! anything is mutated; an unreachable target rejects the decision with no
//! partial effect.

pub mod apply;
pub mod error;

#[cfg(test)]
mod tests;

pub use apply::{ApplyReport, DecisionOutcome, apply_decision, apply_decisions};
pub use error::{DispatchError, DispatchResult};
