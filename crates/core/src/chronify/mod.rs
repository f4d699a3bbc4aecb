//! Turning human date/time strings into timestamps.
//!
//! The filter engine only sees the [`Chronify`] trait. [`NaturalChronify`]
//! is the default implementation; callers may inject their own.
//!
//! Supported input for the default implementation:
//! - clock times: `3pm`, `15:30`, `9:05am`, `noon`, `midnight`, `12am`
//! - absolute dates and date-times: `2023-01-02`, `2023-01-02 14:00`, `01/02/2023 3pm`
//! - relative quantities: `2d ago`, `3 hours ago`, `30m`
//! - date math: `now`, `today`, `yesterday`, `tomorrow`, `monday`, `last friday`,
//!   `today - 2d`, `now + 3h`, `yesterday 3pm`, `today - monday`

pub mod natural;
pub mod units;

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;

pub use natural::{
    DateBase, DateExpr, DateOffset, Direction, DurationUnit, NaturalChronify, parse_date_expr,
    round_date,
};
pub use units::{is_clock, parse_clock, parse_quantity};

/// Error type for date/time parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChronifyError {
    #[error("invalid date/time expression: {0}")]
    InvalidExpression(String),

    #[error("invalid duration unit: {0}")]
    InvalidUnit(String),

    #[error("invalid number in expression: {0}")]
    InvalidNumber(String),

    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("date/time out of range: {0}")]
    OutOfRange(String),
}

/// Which end of an ambiguous range a date-only input resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundMode {
    /// Start of the day (00:00:00).
    #[default]
    Begin,
    /// End of the day (23:59:59).
    End,
}

/// Date-parsing capability consumed by the filter engine.
pub trait Chronify: Send + Sync {
    /// Reference instant that relative expressions are resolved against.
    fn now(&self) -> NaiveDateTime;

    /// Resolve `text` to a timestamp, rounding date-only input per `mode`.
    fn chronify(&self, text: &str, mode: RoundMode) -> Result<NaiveDateTime, ChronifyError>;
}

static RANGE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:to|until|through|thru)\s+").unwrap());

/// Split `"X to Y"` into its two ends. A single expression yields `(X, None)`.
pub fn split_range(text: &str) -> (String, Option<String>) {
    match RANGE_SEP_RE.find(text) {
        Some(m) => {
            let start = text[..m.start()].trim().to_string();
            let end = text[m.end()..].trim();
            (start, (!end.is_empty()).then(|| end.to_string()))
        }
        None => (text.trim().to_string(), None),
    }
}
