//! `ems-policy` — the dispatch policy interface and reference policies.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`context`] | `PolicyContext<'a>` — read-only tick snapshot; `DecisionBatch`  |
//! | [`model`]   | `DispatchPolicy` trait                                          |
//! | [`noop`]    | `NoopPolicy` — never decides anything                           |
//! | [`nearest`] | `NearestAvailablePolicy` — greedy nearest-first with coverage   |
//! | [`random`]  | `RandomPolicy` — seeded random baseline                         |
//! | [`error`]   | `PolicyError`, `PolicyResult<T>`                                |
//!
//! # Design notes
//!
//! Each tick the driver builds a [`PolicyContext`] over the current state,
//! calls [`DispatchPolicy::decide`] once, drops the context, and only then
//! hands the decisions to the validator.  Policies therefore never observe a
//! half-applied batch, and nothing a policy returns can break the state: an
//! illegal decision is ignored and logged.

pub mod context;
pub mod error;
pub mod model;
pub mod nearest;
pub mod noop;
pub mod random;


pub use context::{DecisionBatch, PolicyContext};
pub use ems_core::Decision;
pub use error::{PolicyError, PolicyResult};
pub use model::DispatchPolicy;
pub use nearest::{DEFAULT_COVERAGE_THRESHOLD_MIN, NearestAvailablePolicy};
pub use noop::NoopPolicy;
pub use random::RandomPolicy;
