//! `ems-sim` — tick driver and run statistics for the EMS dispatch simulator.
//!
//! # Tick loop
//!
//! ```text
//! until all emergencies resolved or max_ticks reached:
//!   ① Clock     — advance by tick_minutes; activate due emergencies.
//!   ② Decide    — DispatchPolicy::decide on a read-only PolicyContext.
//!   ③ Apply     — validate + apply each decision in order; illegal ones
//!                 are ignored and logged.
//!   ④ Motion    — advance routes (parallel with the `parallel` feature),
//!                 then fire arrivals in roster order.
//!   ⑤ Resolve   — check all_emergencies_resolved.
//! ```
//!
//! Every activation, decision outcome and arrival goes to the observer,
//! which is an [`EventSink`][ems_world::EventSink].
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs route advancement on Rayon's thread pool.         |
//! | `fx-hash`  | FxHash lookup tables in the world state.               |
//! | `serde`    | Serialize/Deserialize for summaries.                   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ems_core::SimConfig;
//! use ems_policy::NearestAvailablePolicy;
//! use ems_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config, state, NearestAvailablePolicy::new(42)).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! println!("score {:.2}", summary.score);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod stats;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
pub use stats::{
    RunSummary, WaitTimeStatistics, all_emergencies_resolved, compute_score,
    compute_wait_time_statistics,
};
