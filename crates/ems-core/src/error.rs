//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `EmsError` as one
//! variant via `#[from]`.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised by the `ems-core` primitives.
#[derive(Debug, Error)]
pub enum EmsError {
    #[error("invalid timestamp {value:?}: {reason} (expected YYYY-MM-DD-HH-MM-SS)")]
    Timestamp { value: String, reason: String },

    #[error("clock cannot move backwards from {now} to {requested}")]
    ClockRewind {
        now:       NaiveDateTime,
        requested: NaiveDateTime,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ems-core`.
pub type EmsResult<T> = Result<T, EmsError>;
