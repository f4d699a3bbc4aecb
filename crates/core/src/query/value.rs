//! Comparing a field of an entry against an operand: `progress > 50`,
//! `date < 2023-01-04`, `elapsed >= 30m`, `client ^= acme`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::chronify::{Chronify, RoundMode, parse_clock, parse_quantity};
use crate::entry::Entry;
use crate::errors::FilterError;

use super::wildcard::{CaseMode, compile_anchored_wildcard, compile_wildcard};

static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(!)?@?(\S+?)\s*(<=|>=|==|!=|\^=|\$=|\*=|<|>|=)\s*(.*)$").unwrap()
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?%?$").unwrap());

static DURATION_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:elapsed|dur(?:ation)?|int(?:erval)?)$").unwrap());

static DATE_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:d(?:ate)?|t(?:ime)?)$").unwrap());

/// Comparison operator of a value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    /// `=`
    Eq,
    /// `==`, same as `=`.
    StrictEq,
    Ne,
    /// `^=`
    StartsWith,
    /// `$=`
    EndsWith,
    /// `*=`
    Contains,
}

impl Comparator {
    /// Operators that only make sense on strings.
    pub fn is_textual(self) -> bool {
        matches!(self, Comparator::StartsWith | Comparator::EndsWith | Comparator::Contains)
    }

    fn apply<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Eq | Comparator::StrictEq => lhs == rhs,
            Comparator::Ne => lhs != rhs,
            Comparator::StartsWith | Comparator::EndsWith | Comparator::Contains => false,
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<" => Comparator::Lt,
            "<=" => Comparator::Le,
            ">" => Comparator::Gt,
            ">=" => Comparator::Ge,
            "=" => Comparator::Eq,
            "==" => Comparator::StrictEq,
            "!=" => Comparator::Ne,
            "^=" => Comparator::StartsWith,
            "$=" => Comparator::EndsWith,
            "*=" => Comparator::Contains,
            other => return Err(format!("unknown comparator: {other}")),
        })
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "=",
            Comparator::StrictEq => "==",
            Comparator::Ne => "!=",
            Comparator::StartsWith => "^=",
            Comparator::EndsWith => "$=",
            Comparator::Contains => "*=",
        };
        f.write_str(op)
    }
}

/// A parsed `[!]field op value` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueQuery {
    pub negate: bool,
    pub field: String,
    pub op: Comparator,
    pub operand: String,
}

impl ValueQuery {
    /// Parse a query string such as `!progress >= 50%` or `@client ^= "Acme"`.
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidValueQuery(raw.to_string());
        let caps = QUERY_RE.captures(raw.trim()).ok_or_else(invalid)?;
        let op = caps[3].parse::<Comparator>().map_err(|_| invalid())?;
        Ok(Self {
            negate: caps.get(1).is_some(),
            field: caps[2].to_string(),
            op,
            operand: strip_quotes(caps[4].trim()).to_string(),
        })
    }

    /// Check that the operand of a `date`/`time`/`elapsed` query can be read.
    ///
    /// Runs without an entry, so a bad operand fails even when nothing in
    /// the log would reach the comparison. Tag and text fields pass.
    pub fn check_operand(&self, chronify: &dyn Chronify) -> Result<(), FilterError> {
        let bad = || FilterError::InvalidTimeExpression(self.operand.clone());
        if DURATION_FIELD_RE.is_match(&self.field) {
            return parse_quantity(&self.operand).map(drop).ok_or_else(bad);
        }
        if DATE_FIELD_RE.is_match(&self.field) && !self.op.is_textual() {
            if parse_clock(&self.operand).is_some() {
                return Ok(());
            }
            for mode in [RoundMode::Begin, RoundMode::End] {
                chronify.chronify(&self.operand, mode).map_err(|_| bad())?;
            }
        }
        Ok(())
    }
}

impl FromStr for ValueQuery {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ValueQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            f.write_str("!")?;
        }
        write!(f, "{} {} {}", self.field, self.op, self.operand)
    }
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

enum Resolved {
    Duration(i64),
    Timestamp(NaiveDateTime),
    Text(String),
}

fn resolve(entry: &Entry, field: &str) -> Option<Resolved> {
    if DURATION_FIELD_RE.is_match(field) {
        return entry.duration().map(Resolved::Duration);
    }
    if DATE_FIELD_RE.is_match(field) {
        return Some(Resolved::Timestamp(entry.start_time));
    }
    match field.to_lowercase().as_str() {
        "text" => Some(Resolved::Text(entry.search_text())),
        "title" => Some(Resolved::Text(entry.title.clone())),
        "note" => Some(Resolved::Text(entry.note_text())),
        _ => entry.tag_value(field).map(Resolved::Text),
    }
}

// Only values spelled with a unit (`30m`, `1h 30m`) count as quantities.
fn parse_span(s: &str) -> Option<i64> {
    s.chars().any(char::is_alphabetic).then(|| parse_quantity(s)).flatten()
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if !NUMBER_RE.is_match(s) {
        return None;
    }
    s.trim_end_matches('%').parse().ok()
}

/// Evaluate `query` against `entry`.
///
/// A field that cannot be resolved (an absent tag, a duration without an
/// end) never matches, negated or not. Comparisons between a number or date
/// and something that is not one also never match. An operand that cannot be
/// read on a `date`/`time`/`elapsed` field is an error.
pub fn value_match(
    entry: &Entry,
    query: &ValueQuery,
    chronify: &dyn Chronify,
) -> Result<bool, FilterError> {
    let Some(resolved) = resolve(entry, &query.field) else {
        return Ok(false);
    };

    let outcome = match resolved {
        Resolved::Duration(secs) => {
            let wanted = parse_quantity(&query.operand)
                .ok_or_else(|| FilterError::InvalidTimeExpression(query.operand.clone()))?;
            (!query.op.is_textual()).then(|| query.op.apply(secs, wanted))
        }
        Resolved::Timestamp(ts) => {
            if query.op.is_textual() {
                Some(compare_strings(&ts.format("%Y-%m-%d %H:%M").to_string(), query))
            } else {
                let (begin, end) = operand_bounds(entry, &query.operand, chronify)
                    .ok_or_else(|| FilterError::InvalidTimeExpression(query.operand.clone()))?;
                Some(compare_timestamp(ts, begin, end, query.op))
            }
        }
        Resolved::Text(value) => compare_dynamic(entry, &value, query, chronify),
    };

    Ok(outcome.is_some_and(|matched| matched != query.negate))
}

// Resolve an operand to the span it covers: a whole day for a date, an
// instant for a date-time or a clock time on the entry's own day.
fn operand_bounds(
    entry: &Entry,
    operand: &str,
    chronify: &dyn Chronify,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    if let Some(clock) = parse_clock(operand) {
        let at = entry.date().and_time(clock);
        return Some((at, at));
    }
    let begin = chronify.chronify(operand, RoundMode::Begin).ok()?;
    let end = chronify.chronify(operand, RoundMode::End).ok()?;
    Some((begin, end.max(begin)))
}

fn compare_timestamp(
    ts: NaiveDateTime,
    begin: NaiveDateTime,
    end: NaiveDateTime,
    op: Comparator,
) -> bool {
    match op {
        Comparator::Eq | Comparator::StrictEq => ts >= begin && ts <= end,
        Comparator::Ne => ts < begin || ts > end,
        Comparator::Lt => ts < begin,
        Comparator::Le => ts <= end,
        Comparator::Gt => ts > end,
        Comparator::Ge => ts >= begin,
        Comparator::StartsWith | Comparator::EndsWith | Comparator::Contains => false,
    }
}

// Domain is decided by what both sides parse as. `None` is a mismatch.
fn compare_dynamic(
    entry: &Entry,
    value: &str,
    query: &ValueQuery,
    chronify: &dyn Chronify,
) -> Option<bool> {
    if query.op.is_textual() {
        return Some(compare_strings(value, query));
    }

    match (parse_number(value), parse_number(&query.operand)) {
        (Some(lhs), Some(rhs)) => return Some(query.op.apply(lhs, rhs)),
        (Some(_), None) | (None, Some(_)) => return None,
        (None, None) => {}
    }

    if let (Some(lhs), Some(rhs)) = (parse_span(value), parse_span(&query.operand)) {
        return Some(query.op.apply(lhs, rhs));
    }

    let as_time = |s: &str| -> Option<NaiveDateTime> {
        if s.trim().is_empty() {
            return None;
        }
        parse_clock(s)
            .map(|clock| entry.date().and_time(clock))
            .or_else(|| chronify.chronify(s, RoundMode::Begin).ok())
    };
    match (as_time(value), as_time(&query.operand)) {
        (Some(ts), Some(_)) => {
            let (begin, end) = operand_bounds(entry, &query.operand, chronify)?;
            Some(compare_timestamp(ts, begin, end, query.op))
        }
        (Some(_), None) | (None, Some(_)) => None,
        (None, None) => Some(compare_strings(value, query)),
    }
}

fn compare_strings(value: &str, query: &ValueQuery) -> bool {
    let operand = query.operand.as_str();
    match query.op {
        Comparator::Eq | Comparator::StrictEq => {
            compile_anchored_wildcard(operand, CaseMode::Ignore).is_match(value)
        }
        Comparator::Ne => !compile_anchored_wildcard(operand, CaseMode::Ignore).is_match(value),
        Comparator::StartsWith => {
            compile_anchored_wildcard(&format!("{operand}*"), CaseMode::Ignore).is_match(value)
        }
        Comparator::EndsWith => {
            compile_anchored_wildcard(&format!("*{operand}"), CaseMode::Ignore).is_match(value)
        }
        Comparator::Contains => compile_wildcard(operand, CaseMode::Ignore).is_match(value),
        ordering => ordering.apply(value.to_lowercase(), operand.to_lowercase()),
    }
}
