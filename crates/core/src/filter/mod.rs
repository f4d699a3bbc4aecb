//! The filter pipeline: canonical order, predicate chain, slicing.
//!
//! ```text
//! FilterOptions --(Filter::spec)--> FilterSpec --(Filter::apply)--> Vec<Entry>
//! ```
//!
//! Resolution happens once; applying a spec never mutates it or the input.

pub mod options;
pub mod spec;

use crate::chronify::Chronify;
use crate::config::SearchConfig;
use crate::entry::{DONE_TAG, Entry};
use crate::errors::FilterError;
use crate::query::{BoolMode, Finishable, TagMatcher, TagQuery, value_match};

pub use options::{Age, FilterOptions};
pub use spec::{Cutoff, FilterSpec, SearchPredicate, TimeRange};

/// Pipeline stages in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Section,
    Unfinished,
    Value,
    Tag,
    Search,
    DateRange,
    TimeRange,
    OnlyTimed,
    TagFilter,
    Before,
    After,
    Day,
}

const STAGES: [Stage; 12] = [
    Stage::Section,
    Stage::Unfinished,
    Stage::Value,
    Stage::Tag,
    Stage::Search,
    Stage::DateRange,
    Stage::TimeRange,
    Stage::OnlyTimed,
    Stage::TagFilter,
    Stage::Before,
    Stage::After,
    Stage::Day,
];

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Section => "section",
            Stage::Unfinished => "unfinished",
            Stage::Value => "value",
            Stage::Tag => "tag",
            Stage::Search => "search",
            Stage::DateRange => "date_range",
            Stage::TimeRange => "time_range",
            Stage::OnlyTimed => "only_timed",
            Stage::TagFilter => "tag_filter",
            Stage::Before => "before",
            Stage::After => "after",
            Stage::Day => "day",
        }
    }
}

/// Filter engine bound to its collaborators.
///
/// Holds no per-query state, so one `Filter` can serve any number of
/// queries, from any number of threads.
pub struct Filter<'a> {
    chronify: &'a dyn Chronify,
    finishable: &'a dyn Finishable,
    search: SearchConfig,
}

impl<'a> Filter<'a> {
    pub fn new(
        chronify: &'a dyn Chronify,
        finishable: &'a dyn Finishable,
        search: SearchConfig,
    ) -> Self {
        Self { chronify, finishable, search }
    }

    /// Resolve raw options. Every parse error surfaces here, before any entry is looked at,
    /// including unreadable `date`/`time`/`elapsed` operands.
    pub fn spec(&self, options: &FilterOptions) -> Result<FilterSpec, FilterError> {
        FilterSpec::resolve(options, self.chronify, &self.search)
    }

    /// Resolve `options` and apply them in one call.
    pub fn run(
        &self,
        entries: &[Entry],
        options: &FilterOptions,
    ) -> Result<Vec<Entry>, FilterError> {
        let spec = self.spec(options)?;
        self.apply(entries, &spec)
    }

    /// Filter `entries` by `spec`, newest first.
    pub fn apply(&self, entries: &[Entry], spec: &FilterSpec) -> Result<Vec<Entry>, FilterError> {
        let mut sorted = entries.to_vec();
        sorted.sort_by_cached_key(|e| (e.start_time, e.title.to_lowercase()));
        sorted.reverse();

        let done = TagQuery::new([DONE_TAG], BoolMode::And).compile();
        let mut rejected = [0usize; STAGES.len()];
        let mut kept = Vec::with_capacity(sorted.len());

        'entries: for entry in sorted {
            for (i, stage) in STAGES.iter().enumerate() {
                let Some(pass) = self.check(*stage, &entry, spec, &done)? else {
                    continue;
                };
                if pass == spec.negate {
                    rejected[i] += 1;
                    continue 'entries;
                }
            }
            kept.push(entry);
        }

        for (stage, count) in STAGES.iter().zip(rejected) {
            if count > 0 {
                tracing::debug!(stage = stage.name(), rejected = count, "filter stage");
            }
        }

        let matched = kept.len();
        let sliced = slice(kept, spec);
        tracing::debug!(
            total = entries.len(),
            matched,
            returned = sliced.len(),
            negate = spec.negate,
            "filter applied"
        );
        Ok(sliced)
    }

    // `None` when the stage is inactive for this spec.
    fn check(
        &self,
        stage: Stage,
        entry: &Entry,
        spec: &FilterSpec,
        done: &TagMatcher,
    ) -> Result<Option<bool>, FilterError> {
        let ts = entry.start_time;
        let pass = match stage {
            Stage::Section => spec
                .section
                .as_ref()
                .map(|prefix| entry.section.to_lowercase().starts_with(prefix.as_str())),
            Stage::Unfinished => {
                spec.unfinished.then(|| !done.matches(entry, self.finishable))
            }
            Stage::Value => {
                if spec.values.is_empty() {
                    None
                } else {
                    Some(self.values_match(entry, spec)?)
                }
            }
            Stage::Tag => spec.tags.as_ref().map(|m| m.matches(entry, self.finishable)),
            Stage::Search => spec.search.as_ref().map(|s| s.matches(&entry.search_text())),
            Stage::DateRange => spec.date_range.map(|(start, end)| ts >= start && ts <= end),
            Stage::TimeRange => spec.time_range.map(|range| range.contains(ts)),
            Stage::OnlyTimed => spec.only_timed.then(|| entry.duration().is_some()),
            Stage::TagFilter => {
                spec.tag_filter.as_ref().map(|m| m.matches(entry, self.finishable))
            }
            Stage::Before => spec.before.map(|cutoff| cutoff.is_before(ts)),
            Stage::After => spec.after.map(|cutoff| cutoff.is_after(ts)),
            Stage::Day => spec.day.map(|(start, end)| ts >= start && ts < end),
        };
        Ok(pass)
    }

    fn values_match(&self, entry: &Entry, spec: &FilterSpec) -> Result<bool, FilterError> {
        let mut any = false;
        for query in &spec.values {
            let hit = value_match(entry, query, self.chronify)?;
            match spec.value_mode {
                BoolMode::And | BoolMode::Pattern if !hit => return Ok(false),
                BoolMode::Not if hit => return Ok(false),
                BoolMode::Or if hit => return Ok(true),
                _ => {}
            }
            any |= hit;
        }
        Ok(match spec.value_mode {
            BoolMode::Or => any,
            BoolMode::And | BoolMode::Not | BoolMode::Pattern => true,
        })
    }
}

// `kept` is newest first.
fn slice(mut kept: Vec<Entry>, spec: &FilterSpec) -> Vec<Entry> {
    if spec.count == 0 || kept.len() <= spec.count {
        return kept;
    }
    match spec.age {
        Age::Newest => {
            kept.truncate(spec.count);
            kept
        }
        Age::Oldest => {
            kept.reverse();
            kept.truncate(spec.count);
            kept.reverse();
            kept
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronify::NaturalChronify;
    use crate::query::AlwaysFinishable;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn entry(id: &str, start: &str, title: &str) -> Entry {
        Entry::new(id, at(start), title)
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn run(entries: &[Entry], options: &FilterOptions) -> Vec<Entry> {
        let chronify = NaturalChronify::new(at("2023-01-10 12:00"));
        let filter = Filter::new(&chronify, &AlwaysFinishable, SearchConfig::default());
        filter.run(entries, options).unwrap()
    }

    #[test]
    fn ties_break_on_lowercased_title() {
        let entries = vec![
            entry("b", "2023-01-01 09:00", "beta"),
            entry("a", "2023-01-01 09:00", "Alpha"),
            entry("c", "2023-01-02 09:00", "gamma"),
        ];
        let out = run(&entries, &FilterOptions::default());
        assert_eq!(ids(&out), vec!["c", "b", "a"]);
    }

    #[test]
    fn negate_inverts_each_active_stage() {
        let entries = vec![
            entry("1", "2023-01-01 09:00", "report @work"),
            entry("2", "2023-01-02 09:00", "groceries @home"),
            entry("3", "2023-01-03 09:00", "report @home"),
        ];
        let opts = FilterOptions {
            tag: vec!["work".into()],
            search: Some("report".into()),
            negate: true,
            ..Default::default()
        };
        assert_eq!(ids(&run(&entries, &opts)), vec!["2"]);
    }

    #[test]
    fn unfinished_and_only_timed() {
        let entries = vec![
            entry("1", "2023-01-01 09:00", "open task"),
            entry("2", "2023-01-02 09:00", "closed @done(2023-01-02 10:00)"),
        ];
        let unfinished = FilterOptions { unfinished: true, ..Default::default() };
        assert_eq!(ids(&run(&entries, &unfinished)), vec!["1"]);

        let timed = FilterOptions { only_timed: true, ..Default::default() };
        assert_eq!(ids(&run(&entries, &timed)), vec!["2"]);
    }

    #[test]
    fn value_queries_combine_per_mode() {
        let entries = vec![
            entry("1", "2023-01-01 09:00", "a @progress(20) @size(3)"),
            entry("2", "2023-01-02 09:00", "b @progress(90) @size(1)"),
            entry("3", "2023-01-03 09:00", "c @progress(95) @size(8)"),
        ];
        let mut opts = FilterOptions {
            val: vec!["progress > 50".into(), "size > 5".into()],
            ..Default::default()
        };
        assert_eq!(ids(&run(&entries, &opts)), vec!["3"]);

        opts.bool_mode = BoolMode::Or;
        assert_eq!(ids(&run(&entries, &opts)), vec!["3", "2"]);

        opts.bool_mode = BoolMode::Not;
        assert_eq!(ids(&run(&entries, &opts)), vec!["1"]);
    }

    #[test]
    fn section_prefix() {
        let entries = vec![
            entry("1", "2023-01-01 09:00", "x").with_section("Later"),
            entry("2", "2023-01-02 09:00", "y"),
        ];
        let opts = FilterOptions { section: Some("lat".into()), ..Default::default() };
        assert_eq!(ids(&run(&entries, &opts)), vec!["1"]);
    }

    #[test]
    fn cutoffs_and_day_shortcuts() {
        let entries = vec![
            entry("1", "2023-01-09 08:00", "morning"),
            entry("2", "2023-01-09 16:00", "afternoon"),
            entry("3", "2023-01-10 10:00", "today"),
        ];
        let before = FilterOptions { before: Some("noon".into()), ..Default::default() };
        assert_eq!(ids(&run(&entries, &before)), vec!["3", "1"]);

        let yesterday = FilterOptions { yesterday: true, ..Default::default() };
        assert_eq!(ids(&run(&entries, &yesterday)), vec!["2", "1"]);

        let after = FilterOptions { after: Some("yesterday".into()), ..Default::default() };
        assert_eq!(ids(&run(&entries, &after)), vec!["3"]);
    }

    #[test]
    fn value_operand_errors_propagate() {
        let entries = vec![entry("1", "2023-01-01 09:00", "x")];
        let chronify = NaturalChronify::new(at("2023-01-10 12:00"));
        let filter = Filter::new(&chronify, &AlwaysFinishable, SearchConfig::default());
        let opts = FilterOptions { val: vec!["date > someday".into()], ..Default::default() };
        assert_eq!(
            filter.run(&entries, &opts),
            Err(FilterError::InvalidTimeExpression("someday".into()))
        );
    }
}
