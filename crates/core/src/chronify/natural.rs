//! Default [`Chronify`] implementation built on a small date-math grammar.
//!
//! Expressions have a base, an optional offset, and an optional clock time:
//! - `today`, `yesterday`, `tomorrow`, `now`, `monday` / `last monday`
//! - `today + 1d`, `today - 2w`, `now - 3h`, `today + 1M`
//! - `today - monday`, `today + friday` (relative weekday)
//! - `yesterday 3pm`, `monday at 9:30`

use std::sync::LazyLock;

use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use regex::Regex;

use super::units::{parse_clock, parse_quantity};
use super::{Chronify, ChronifyError, RoundMode};

static EXPR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:last\s+)?([a-z]+)(?:\s*([+-])\s*(\d+[a-z]|[a-z]+))?(?:\s+(?:at\s+)?(.+))?$")
        .unwrap()
});

static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([mhdwMyY])$").unwrap());

static AGO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s+ago$").unwrap());

const DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// The day or instant an expression starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBase {
    /// The reference instant itself.
    Now,
    Today,
    Yesterday,
    Tomorrow,
    /// Most recent occurrence of a weekday, today included.
    Weekday(Weekday),
}

/// A duration offset to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOffset {
    /// No offset
    None,
    /// Duration: +/- N units (minutes, hours, days, weeks, months, years)
    Duration { amount: i64, unit: DurationUnit },
    /// Relative weekday: previous/next Monday, Tuesday, etc.
    Weekday { weekday: Weekday, direction: Direction },
}

/// Units for duration offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

/// Direction for relative weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `-`: the closest matching day before.
    Previous,
    /// `+`: the closest matching day after.
    Next,
}

/// A fully parsed date math expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateExpr {
    pub base: DateBase,
    pub offset: DateOffset,
    pub clock: Option<NaiveTime>,
}

/// Parse a date math expression.
///
/// Examples:
/// - `today` -> DateExpr { base: Today, offset: None, clock: None }
/// - `today + 1d` -> DateExpr { base: Today, offset: Duration { amount: 1, unit: Days }, clock: None }
/// - `yesterday 3pm` -> DateExpr { base: Yesterday, offset: None, clock: Some(15:00) }
pub fn parse_date_expr(input: &str) -> Result<DateExpr, ChronifyError> {
    let input = input.trim();
    let caps = EXPR_RE
        .captures(input)
        .ok_or_else(|| ChronifyError::InvalidExpression(input.to_string()))?;

    let base = parse_base(&caps[1])?;

    let offset = if let (Some(op), Some(operand)) = (caps.get(2), caps.get(3)) {
        parse_offset(op.as_str(), operand.as_str())?
    } else {
        DateOffset::None
    };

    let clock = match caps.get(4) {
        Some(m) => Some(
            parse_clock(m.as_str())
                .ok_or_else(|| ChronifyError::InvalidExpression(input.to_string()))?,
        ),
        None => None,
    };

    Ok(DateExpr { base, offset, clock })
}

fn parse_base(s: &str) -> Result<DateBase, ChronifyError> {
    match s.to_lowercase().as_str() {
        "now" => Ok(DateBase::Now),
        "today" => Ok(DateBase::Today),
        "yesterday" => Ok(DateBase::Yesterday),
        "tomorrow" => Ok(DateBase::Tomorrow),
        other => parse_weekday(other)
            .map(DateBase::Weekday)
            .map_err(|_| ChronifyError::InvalidExpression(format!("unknown base: {s}"))),
    }
}

fn parse_offset(op: &str, operand: &str) -> Result<DateOffset, ChronifyError> {
    let direction = match op {
        "+" => Direction::Next,
        "-" => Direction::Previous,
        _ => return Err(ChronifyError::InvalidExpression(format!("invalid operator: {op}"))),
    };

    if let Ok(weekday) = parse_weekday(operand) {
        return Ok(DateOffset::Weekday { weekday, direction });
    }

    let caps = OFFSET_RE
        .captures(operand)
        .ok_or_else(|| ChronifyError::InvalidExpression(format!("invalid offset: {operand}")))?;
    let amount: i64 =
        caps[1].parse().map_err(|_| ChronifyError::InvalidNumber(caps[1].to_string()))?;
    let unit = DurationUnit::from_suffix(&caps[2])
        .ok_or_else(|| ChronifyError::InvalidUnit(caps[2].to_string()))?;

    let amount = if direction == Direction::Previous { -amount } else { amount };
    Ok(DateOffset::Duration { amount, unit })
}

fn parse_weekday(s: &str) -> Result<Weekday, ChronifyError> {
    let lowered = s.to_lowercase();
    let name = match lowered.as_str() {
        "tues" => "tue",
        "thur" | "thurs" => "thu",
        other => other,
    };
    name.parse().map_err(|_| ChronifyError::InvalidWeekday(s.to_string()))
}

impl DurationUnit {
    /// `m`inutes, `h`ours, `d`ays, `w`eeks, `M`onths, `y`ears.
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "m" => DurationUnit::Minutes,
            "h" => DurationUnit::Hours,
            "d" => DurationUnit::Days,
            "w" => DurationUnit::Weeks,
            "M" => DurationUnit::Months,
            "y" | "Y" => DurationUnit::Years,
            _ => return None,
        })
    }

    fn shift(self, dt: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
        let delta = match self {
            DurationUnit::Minutes => TimeDelta::try_minutes(amount),
            DurationUnit::Hours => TimeDelta::try_hours(amount),
            DurationUnit::Days => TimeDelta::try_days(amount),
            DurationUnit::Weeks => TimeDelta::try_weeks(amount),
            DurationUnit::Months => return shift_months(dt, amount),
            DurationUnit::Years => return shift_months(dt, amount.checked_mul(12)?),
        };
        dt.checked_add_signed(delta?)
    }
}

impl DateOffset {
    /// `None` when the result falls outside the representable range.
    fn shift(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            DateOffset::None => Some(dt),
            DateOffset::Duration { amount, unit } => unit.shift(dt, amount),
            DateOffset::Weekday { weekday, direction } => {
                step_to_weekday(dt.date(), weekday, direction).map(|d| d.and_time(dt.time()))
            }
        }
    }
}

impl DateExpr {
    /// Resolve against a reference instant.
    pub fn evaluate(
        &self,
        now: NaiveDateTime,
        mode: RoundMode,
    ) -> Result<NaiveDateTime, ChronifyError> {
        let out_of_range = || ChronifyError::OutOfRange(format!("{self:?}"));
        let today = now.date();
        let day = match self.base {
            DateBase::Now => {
                let dt = self.offset.shift(now).ok_or_else(out_of_range)?;
                return Ok(match self.clock {
                    Some(clock) => dt.date().and_time(clock),
                    None => dt,
                });
            }
            DateBase::Today => Some(today),
            DateBase::Yesterday => today.pred_opt(),
            DateBase::Tomorrow => today.succ_opt(),
            DateBase::Weekday(weekday) => Some(most_recent_weekday(today, weekday)),
        }
        .ok_or_else(out_of_range)?;

        // Day-based expressions ignore sub-day offsets.
        let date = match self.offset {
            DateOffset::Duration { unit: DurationUnit::Hours | DurationUnit::Minutes, .. } => day,
            ref offset => {
                offset.shift(day.and_time(NaiveTime::MIN)).ok_or_else(out_of_range)?.date()
            }
        };
        Ok(match self.clock {
            Some(clock) => date.and_time(clock),
            None => round_date(date, mode),
        })
    }
}

/// Resolve a date-only value to the start or end of that day.
pub fn round_date(date: NaiveDate, mode: RoundMode) -> NaiveDateTime {
    match mode {
        RoundMode::Begin => date.and_time(NaiveTime::MIN),
        RoundMode::End => date
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN)),
    }
}

// Day-of-month clamps to the target month's length.
fn shift_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 { dt.checked_add_months(span) } else { dt.checked_sub_months(span) }
}

// Strictly before or after `date`, never `date` itself.
fn step_to_weekday(date: NaiveDate, target: Weekday, direction: Direction) -> Option<NaiveDate> {
    let step = match direction {
        Direction::Previous => -1,
        Direction::Next => 1,
    };
    (1..=7)
        .filter_map(|n| date.checked_add_signed(TimeDelta::days(step * n)))
        .find(|d| d.weekday() == target)
}

fn most_recent_weekday(date: NaiveDate, target: Weekday) -> NaiveDate {
    (0..7)
        .filter_map(|n| date.checked_sub_signed(TimeDelta::days(n)))
        .find(|d| d.weekday() == target)
        .unwrap_or(date)
}

fn parse_absolute(text: &str, mode: RoundMode) -> Option<NaiveDateTime> {
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt);
    }

    let (date_part, clock_part) = match text.split_once(char::is_whitespace) {
        Some((d, c)) => (d, Some(c.trim())),
        None => (text, None),
    };
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())?;

    match clock_part {
        Some(clock) => parse_clock(clock).map(|t| date.and_time(t)),
        None => Some(round_date(date, mode)),
    }
}

fn parse_ago(text: &str) -> Option<i64> {
    if let Some(caps) = AGO_RE.captures(text) {
        return parse_quantity(&caps[1]);
    }
    // A bare quantity with a unit ("30m", "2d") also means "that long ago".
    if text.chars().any(char::is_alphabetic) {
        return parse_quantity(text);
    }
    None
}

/// Chronify service resolving expressions against a fixed reference instant.
#[derive(Debug, Clone, Copy)]
pub struct NaturalChronify {
    now: NaiveDateTime,
}

impl NaturalChronify {
    /// Resolve relative expressions against `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Resolve relative expressions against the local wall clock.
    pub fn from_local_clock() -> Self {
        Self::new(Local::now().naive_local())
    }
}

impl Chronify for NaturalChronify {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn chronify(&self, text: &str, mode: RoundMode) -> Result<NaiveDateTime, ChronifyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChronifyError::InvalidExpression(String::new()));
        }

        if let Some(clock) = parse_clock(text) {
            return Ok(self.now.date().and_time(clock));
        }
        if let Some(dt) = parse_absolute(text, mode) {
            return Ok(dt);
        }
        if let Some(secs) = parse_ago(text) {
            return TimeDelta::try_seconds(secs)
                .and_then(|ago| self.now.checked_sub_signed(ago))
                .ok_or_else(|| ChronifyError::OutOfRange(text.to_string()));
        }

        parse_date_expr(text)?.evaluate(self.now, mode)
    }
}
