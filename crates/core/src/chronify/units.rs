//! Clock times and humanized quantities.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(am|pm|a|p)?$").unwrap()
});

static HMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{2})(?::(\d{2}))?$").unwrap());

// Longer unit spellings first so `min` is not read as `m` + `in`.
static QTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|wks?|w)",
    )
    .unwrap()
});

/// Largest quantity accepted, in seconds. `TimeDelta` holds up to
/// `i64::MAX` milliseconds.
pub const MAX_QUANTITY_SECS: i64 = i64::MAX / 1000;

/// Parse a clock time such as `3pm`, `15:30`, `9:05am`, `noon`, `midnight`.
///
/// `12am` is midnight (00:00). A bare hour (`9`) is accepted as 09:00.
pub fn parse_clock(input: &str) -> Option<NaiveTime> {
    let s = input.trim().to_lowercase();
    match s.as_str() {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let caps = CLOCK_RE.captures(&s)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let second: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;

    if let Some(meridian) = caps.get(4) {
        if hour == 0 || hour > 12 {
            return None;
        }
        hour %= 12;
        if meridian.as_str().starts_with('p') {
            hour += 12;
        }
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Whether `input` is a clock time with no date component.
pub fn is_clock(input: &str) -> bool {
    parse_clock(input).is_some()
}

/// Convert a humanized quantity to seconds.
///
/// Accepts `30m`, `1h30m`, `2 days`, `1.5h`, `1:30` (h:mm), `1:30:15`.
/// A bare number is read as minutes.
pub fn parse_quantity(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = HMS_RE.captures(s) {
        let hours: i64 = caps[1].parse().ok()?;
        let minutes: i64 = caps[2].parse().ok()?;
        let seconds: i64 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
        return hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .filter(|total| *total <= MAX_QUANTITY_SECS);
    }

    if let Ok(minutes) = s.parse::<f64>() {
        return whole_seconds(minutes * 60.0);
    }

    let mut total = 0.0_f64;
    let mut last = 0;
    for caps in QTY_RE.captures_iter(s) {
        let whole = caps.get(0)?;
        if !s[last..whole.start()].trim().is_empty() {
            return None;
        }
        last = whole.end();

        let amount: f64 = caps[1].parse().ok()?;
        let unit = caps[2].to_lowercase();
        let factor = match unit.chars().next()? {
            's' => 1.0,
            'm' => 60.0,
            'h' => 3600.0,
            'd' => 86_400.0,
            'w' => 604_800.0,
            _ => return None,
        };
        total += amount * factor;
    }

    if last == 0 || !s[last..].trim().is_empty() {
        return None;
    }
    whole_seconds(total)
}

// Rejects NaN, infinities, negatives and spans a `TimeDelta` cannot hold.
fn whole_seconds(secs: f64) -> Option<i64> {
    (secs.is_finite() && (0.0..=MAX_QUANTITY_SECS as f64).contains(&secs))
        .then(|| secs.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_clock("3pm"), Some(hm(15, 0)));
        assert_eq!(parse_clock("3:30 PM"), Some(hm(15, 30)));
        assert_eq!(parse_clock("15:30"), Some(hm(15, 30)));
        assert_eq!(parse_clock("9"), Some(hm(9, 0)));
        assert_eq!(parse_clock("noon"), Some(hm(12, 0)));
        assert_eq!(parse_clock("midnight"), Some(hm(0, 0)));
    }

    #[test]
    fn test_twelve_am_is_midnight() {
        assert_eq!(parse_clock("12am"), Some(hm(0, 0)));
        assert_eq!(parse_clock("12pm"), Some(hm(12, 0)));
    }

    #[test]
    fn test_parse_clock_rejects() {
        assert_eq!(parse_clock("13pm"), None);
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("2023-01-01"), None);
        assert_eq!(parse_clock("today"), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("30m"), Some(1800));
        assert_eq!(parse_quantity("1h30m"), Some(5400));
        assert_eq!(parse_quantity("1h 30 min"), Some(5400));
        assert_eq!(parse_quantity("2 days"), Some(172_800));
        assert_eq!(parse_quantity("1.5h"), Some(5400));
        assert_eq!(parse_quantity("1:30"), Some(5400));
        assert_eq!(parse_quantity("45"), Some(2700));
    }

    #[test]
    fn test_parse_quantity_rejects() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("soon"), None);
        assert_eq!(parse_quantity("3 months"), None);
        assert_eq!(parse_quantity("1h and stuff"), None);
    }

    #[test]
    fn test_parse_quantity_rejects_out_of_range() {
        assert_eq!(parse_quantity("9999999999999999:00"), None);
        assert_eq!(parse_quantity("99999999999999999999999w"), None);
        assert_eq!(parse_quantity("1e400"), None);
        assert_eq!(parse_quantity("inf"), None);
        assert_eq!(parse_quantity("NaN"), None);
        assert_eq!(parse_quantity("-5"), None);
    }
}
