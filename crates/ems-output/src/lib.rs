//! `ems-output` — run output for the EMS dispatch simulator.
//!
//! Two kinds of output are provided:
//!
//! - [`TextEventLog`], a human-readable log with one line per engine event
//!   and a statistics block at the end;
//! - table backends implementing [`OutputWriter`], driven by
//!   [`SimOutputObserver`]:
//!
//! | Feature   | Backend     | Files created                                          |
//! |-----------|-------------|--------------------------------------------------------|
//! | *(none)*  | CSV         | `tick_summaries.csv`, `outcomes.csv`, `run_summary.csv` |
//! | `sqlite`  | SQLite      | `output.db`                                            |
//!
//! Both observers implement `ems_sim::SimObserver`; pass them as a pair to
//! get both from one run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ems_output::{CsvWriter, SimOutputObserver, TextEventLog};
//!
//! let log = TextEventLog::new(BufWriter::new(File::create("events.log")?))?;
//! let table = SimOutputObserver::new(CsvWriter::new(Path::new("./output"))?);
//! let mut obs = (log, table);
//! sim.run(&mut obs)?;
//! obs.1.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod text;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{OutcomeRow, RunSummaryRow, TickSummaryRow};
pub use text::{LOG_HEADER, TextEventLog};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
