//! Resolving raw options into an immutable [`FilterSpec`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::chronify::{Chronify, RoundMode, parse_clock, round_date, split_range};
use crate::config::SearchConfig;
use crate::errors::FilterError;
use crate::query::wildcard::{compile_fuzzy, compile_literal, compile_raw_regex, is_raw_regex};
use crate::query::{
    BoolMode, CaseMode, CompiledPhrase, Matcher, SearchMatching, TagMatcher, TagQuery, ValueQuery,
    parse_phrase,
};

use super::options::{Age, FilterOptions};

/// Compiled free-text predicate.
#[derive(Debug, Clone)]
pub enum SearchPredicate {
    Phrase(CompiledPhrase),
    Pattern(Matcher),
}

impl SearchPredicate {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            SearchPredicate::Phrase(phrase) => phrase.matches(text),
            SearchPredicate::Pattern(matcher) => matcher.is_match(text),
        }
    }
}

/// Daily window applied to each entry's own date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// `None` is midnight at the start of the day.
    pub start: Option<NaiveTime>,
    /// `None` (or midnight) is midnight at the end of the day.
    pub end: Option<NaiveTime>,
}

impl TimeRange {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let day = ts.date();
        let start = day.and_time(self.start.unwrap_or(NaiveTime::MIN));
        let end = match self.end {
            Some(end) if end != NaiveTime::MIN => day.and_time(end),
            _ => next_midnight(day),
        };
        if end < start {
            // overnight window, e.g. 10pm to 2am
            ts >= start || ts <= end
        } else {
            ts >= start && ts <= end
        }
    }
}

/// A single-sided bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// A clock time on the entry's own date.
    Clock(NaiveTime),
    Instant(NaiveDateTime),
}

impl Cutoff {
    fn resolve(self, ts: NaiveDateTime) -> NaiveDateTime {
        match self {
            Cutoff::Clock(clock) => ts.date().and_time(clock),
            Cutoff::Instant(at) => at,
        }
    }

    pub fn is_before(self, ts: NaiveDateTime) -> bool {
        ts < self.resolve(ts)
    }

    pub fn is_after(self, ts: NaiveDateTime) -> bool {
        ts > self.resolve(ts)
    }
}

/// Every active predicate, fully resolved. Built once per query.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Lowercased section prefix.
    pub section: Option<String>,
    pub unfinished: bool,
    pub values: Vec<ValueQuery>,
    pub value_mode: BoolMode,
    pub tags: Option<TagMatcher>,
    pub search: Option<SearchPredicate>,
    /// Inclusive bounds.
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    pub time_range: Option<TimeRange>,
    pub only_timed: bool,
    pub tag_filter: Option<TagMatcher>,
    pub before: Option<Cutoff>,
    pub after: Option<Cutoff>,
    /// `[start, end)` bounds of the today/yesterday shortcut.
    pub day: Option<(NaiveDateTime, NaiveDateTime)>,
    pub negate: bool,
    pub count: usize,
    pub age: Age,
}

fn next_midnight(day: NaiveDate) -> NaiveDateTime {
    (day + Duration::days(1)).and_time(NaiveTime::MIN)
}

fn time_error(text: &str) -> FilterError {
    FilterError::InvalidTimeExpression(text.to_string())
}

fn chronify_text(
    chronify: &dyn Chronify,
    text: &str,
    mode: RoundMode,
) -> Result<NaiveDateTime, FilterError> {
    chronify.chronify(text, mode).map_err(|e| {
        tracing::debug!(input = %text, error = %e, "unreadable time expression");
        time_error(text)
    })
}

fn clock(text: &str) -> Result<NaiveTime, FilterError> {
    parse_clock(text).ok_or_else(|| time_error(text))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterSpec {
    pub fn resolve(
        options: &FilterOptions,
        chronify: &dyn Chronify,
        search: &SearchConfig,
    ) -> Result<Self, FilterError> {
        if options.today && options.yesterday {
            return Err(FilterError::InvalidOption {
                option: "today".into(),
                message: "cannot be combined with yesterday".into(),
            });
        }

        let section = present(&options.section)
            .filter(|s| !s.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);

        let values = options
            .val
            .iter()
            .filter(|v| !v.trim().is_empty())
            .map(|v| ValueQuery::parse(v))
            .collect::<Result<Vec<_>, _>>()?;
        for query in &values {
            query.check_operand(chronify)?;
        }

        let tags = Some(TagQuery::parse(&options.tag, options.bool_mode))
            .filter(|q| !q.is_empty())
            .map(|q| q.compile());

        let tag_filter = options
            .tag_filter
            .as_ref()
            .filter(|q| !q.is_empty())
            .map(TagQuery::compile);

        let search_pred = present(&options.search).map(|query| {
            compile_search(
                query,
                options.matching.unwrap_or(search.matching),
                options.case.unwrap_or(search.case),
                search.distance,
            )
        });

        let (date_range, time_range) = resolve_ranges(options, chronify)?;

        let before = present(&options.before)
            .map(|b| resolve_cutoff(b, chronify, RoundMode::Begin))
            .transpose()?;
        let after = present(&options.after)
            .map(|a| resolve_cutoff(a, chronify, RoundMode::End))
            .transpose()?;

        let today = chronify.now().date();
        let shortcut = match (options.today, options.yesterday) {
            (true, _) => Some(today),
            (_, true) => Some(today - Duration::days(1)),
            _ => None,
        };
        let day = shortcut.map(|d| (d.and_time(NaiveTime::MIN), next_midnight(d)));

        Ok(Self {
            section,
            unfinished: options.unfinished,
            values,
            value_mode: options.bool_mode,
            tags,
            search: search_pred,
            date_range,
            time_range,
            only_timed: options.only_timed,
            tag_filter,
            before,
            after,
            day,
            negate: options.negate,
            count: options.count,
            age: options.age,
        })
    }
}

fn compile_search(
    query: &str,
    matching: SearchMatching,
    case: CaseMode,
    distance: usize,
) -> SearchPredicate {
    if is_raw_regex(query) {
        return SearchPredicate::Pattern(compile_raw_regex(query, case));
    }
    match matching {
        SearchMatching::Fuzzy => SearchPredicate::Pattern(compile_fuzzy(query, distance, case)),
        SearchMatching::Exact => SearchPredicate::Pattern(compile_literal(query, case)),
        SearchMatching::Pattern => SearchPredicate::Phrase(parse_phrase(query).compile(case)),
    }
}

type Ranges = (Option<(NaiveDateTime, NaiveDateTime)>, Option<TimeRange>);

fn resolve_ranges(options: &FilterOptions, chronify: &dyn Chronify) -> Result<Ranges, FilterError> {
    let mut date_range = None;
    let mut time_range = None;

    if let Some((start, end)) = &options.date_filter {
        date_range = Some(date_range_of(start, end.as_deref(), chronify)?);
    }

    if let Some((start, end)) = &options.time_filter {
        let start = present(start).map(clock).transpose()?;
        let end = present(end).map(clock).transpose()?;
        if start.is_some() || end.is_some() {
            time_range = Some(TimeRange { start, end });
        }
    }

    if date_range.is_none()
        && time_range.is_none()
        && let Some(from) = present(&options.from)
    {
        let (start, end) = split_range(from);
        let end_is_clock = end.as_deref().is_none_or(|e| parse_clock(e).is_some());
        match parse_clock(&start) {
            Some(start_clock) if end_is_clock => {
                let end = end.as_deref().map(clock).transpose()?;
                time_range = Some(TimeRange { start: Some(start_clock), end });
            }
            _ => date_range = Some(date_range_of(&start, end.as_deref(), chronify)?),
        }
    }

    Ok((date_range, time_range))
}

fn date_range_of(
    start: &str,
    end: Option<&str>,
    chronify: &dyn Chronify,
) -> Result<(NaiveDateTime, NaiveDateTime), FilterError> {
    let begin = chronify_text(chronify, start, RoundMode::Begin)?;
    let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
        Some(end) => chronify_text(chronify, end, RoundMode::End)?,
        None => round_date(begin.date(), RoundMode::End),
    };
    Ok((begin, end))
}

fn resolve_cutoff(
    text: &str,
    chronify: &dyn Chronify,
    mode: RoundMode,
) -> Result<Cutoff, FilterError> {
    match parse_clock(text) {
        Some(clock) => Ok(Cutoff::Clock(clock)),
        None => chronify_text(chronify, text, mode).map(Cutoff::Instant),
    }
}
