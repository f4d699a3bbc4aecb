//! Deciding whether an entry's tags satisfy a tag query.

use std::fmt;
use std::str::FromStr;

use crate::entry::{DONE_TAG, Entry, Tag};

use super::phrase::{Term, parse_phrase};
use super::wildcard::{CaseMode, Matcher, compile_raw_regex, compile_tag_name};

/// How multiple tags (or value queries) combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolMode {
    /// Every name must match.
    #[default]
    And,
    /// At least one name must match.
    Or,
    /// No name may match.
    Not,
    /// The list is read as a phrase query over tag names (`+a -b c`).
    Pattern,
}

impl FromStr for BoolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" | "all" => Ok(BoolMode::And),
            "or" | "any" => Ok(BoolMode::Or),
            "not" | "none" => Ok(BoolMode::Not),
            "pattern" => Ok(BoolMode::Pattern),
            other => Err(format!("unknown bool mode: {other}")),
        }
    }
}

impl fmt::Display for BoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoolMode::And => "AND",
            BoolMode::Or => "OR",
            BoolMode::Not => "NOT",
            BoolMode::Pattern => "PATTERN",
        };
        f.write_str(name)
    }
}

/// Whether an entry may receive a `done` tag.
///
/// Entries that can never be finished are exempt from `done` criteria.
pub trait Finishable: Send + Sync {
    fn is_finishable(&self, entry: &Entry) -> bool;
}

impl<F> Finishable for F
where
    F: Fn(&Entry) -> bool + Send + Sync,
{
    fn is_finishable(&self, entry: &Entry) -> bool {
        self(entry)
    }
}

/// Every entry can be finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFinishable;

impl Finishable for AlwaysFinishable {
    fn is_finishable(&self, _entry: &Entry) -> bool {
        true
    }
}

/// Configuration-driven exemption list.
///
/// Items starting with `@` name tags; anything else names a section.
#[derive(Debug, Clone, Default)]
pub struct NeverFinish {
    tags: Vec<String>,
    sections: Vec<String>,
}

impl NeverFinish {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut never = Self::default();
        for item in items {
            let item = item.as_ref().trim();
            match item.strip_prefix('@') {
                Some(tag) if !tag.is_empty() => never.tags.push(tag.to_string()),
                Some(_) => {}
                None if !item.is_empty() => never.sections.push(item.to_lowercase()),
                None => {}
            }
        }
        never
    }
}

impl Finishable for NeverFinish {
    fn is_finishable(&self, entry: &Entry) -> bool {
        let section = entry.section.to_lowercase();
        if self.sections.iter().any(|s| *s == section) {
            return false;
        }
        let tags = entry.tags();
        !self.tags.iter().any(|name| tags.iter().any(|t| t.is_named(name)))
    }
}

/// A list of tag name patterns and how they combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    pub tags: Vec<String>,
    pub mode: BoolMode,
}

impl TagQuery {
    pub fn new<I, S>(tags: I, mode: BoolMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { tags: tags.into_iter().map(Into::into).collect(), mode }
    }

    /// Build from raw strings such as `"@work, urgent"`, splitting on commas
    /// and whitespace. Pattern mode keeps `+`/`-` prefixes intact.
    pub fn parse<S: AsRef<str>>(raw: &[S], mode: BoolMode) -> Self {
        let tags = raw
            .iter()
            .flat_map(|s| split_tags(s.as_ref()))
            .collect::<Vec<_>>();
        Self { tags, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Compile the name patterns once for repeated evaluation.
    pub fn compile(&self) -> TagMatcher {
        if self.mode == BoolMode::Pattern {
            let query = parse_phrase(&self.tags.join(" "));
            let terms = |list: &[Term]| -> Vec<TagTerm> { list.iter().map(TagTerm::from_term).collect() };
            return TagMatcher {
                mode: BoolMode::Pattern,
                must: terms(&query.must),
                should: terms(&query.should),
                must_not: terms(&query.must_not),
                requires_should: query.requires_should(),
                empty: query.is_empty(),
            };
        }

        TagMatcher {
            mode: self.mode,
            must: self
                .tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| TagTerm::from_name(t))
                .collect(),
            should: Vec::new(),
            must_not: Vec::new(),
            requires_should: false,
            empty: self.tags.iter().all(|t| t.trim().is_empty()),
        }
    }
}

/// Split a raw tag list on commas and whitespace.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
struct TagTerm {
    is_done: bool,
    matcher: Matcher,
}

impl TagTerm {
    fn from_name(name: &str) -> Self {
        let bare = name.trim().trim_start_matches('@');
        Self { is_done: bare.eq_ignore_ascii_case(DONE_TAG), matcher: compile_tag_name(bare) }
    }

    fn from_term(term: &Term) -> Self {
        match term {
            Term::Regex(rx) => Self {
                is_done: false,
                matcher: compile_raw_regex(&format!("/{rx}/"), CaseMode::Ignore),
            },
            other => Self::from_name(other.text()),
        }
    }

    fn matches(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|t| self.matcher.is_match(&t.name))
    }
}

/// A compiled [`TagQuery`].
#[derive(Debug, Clone)]
pub struct TagMatcher {
    mode: BoolMode,
    must: Vec<TagTerm>,
    should: Vec<TagTerm>,
    must_not: Vec<TagTerm>,
    requires_should: bool,
    empty: bool,
}

impl TagMatcher {
    /// Evaluate against one entry. An empty query always matches.
    pub fn matches(&self, entry: &Entry, finishable: &dyn Finishable) -> bool {
        if self.empty {
            return true;
        }

        let tags = entry.tags();
        let mut exempt_cache = None;
        let mut exempt = |term: &TagTerm| {
            term.is_done
                && *exempt_cache.get_or_insert_with(|| !finishable.is_finishable(entry))
        };

        match self.mode {
            BoolMode::And => all_tags(&self.must, &tags, &mut exempt),
            BoolMode::Or => any_tags(&self.must, &tags, &mut exempt),
            BoolMode::Not => no_tags(&self.must, &tags, &mut exempt),
            BoolMode::Pattern => {
                no_tags(&self.must_not, &tags, &mut exempt)
                    && all_tags(&self.must, &tags, &mut exempt)
                    && (!self.requires_should || any_tags(&self.should, &tags, &mut exempt))
            }
        }
    }
}

// An exempt `done` term is skipped.
fn all_tags(terms: &[TagTerm], tags: &[Tag], exempt: &mut impl FnMut(&TagTerm) -> bool) -> bool {
    for term in terms {
        if exempt(term) {
            continue;
        }
        if !term.matches(tags) {
            return false;
        }
    }
    true
}

// An exempt `done` term satisfies the query outright.
fn any_tags(terms: &[TagTerm], tags: &[Tag], exempt: &mut impl FnMut(&TagTerm) -> bool) -> bool {
    for term in terms {
        if exempt(term) || term.matches(tags) {
            return true;
        }
    }
    false
}

// An exempt `done` term fails the query outright.
fn no_tags(terms: &[TagTerm], tags: &[Tag], exempt: &mut impl FnMut(&TagTerm) -> bool) -> bool {
    for term in terms {
        if exempt(term) || term.matches(tags) {
            return false;
        }
    }
    true
}

/// Whether `entry` satisfies `query`, optionally negated.
///
/// An empty tag list always matches, negated or not: the absence of a tag
/// criterion never excludes an entry.
pub fn tag_match(
    entry: &Entry,
    query: &TagQuery,
    negate: bool,
    finishable: &dyn Finishable,
) -> bool {
    let matcher = query.compile();
    if matcher.empty {
        return true;
    }
    matcher.matches(entry, finishable) != negate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn entry(title: &str) -> Entry {
        let start = NaiveDateTime::parse_from_str("2023-01-01 09:00", "%Y-%m-%d %H:%M").unwrap();
        Entry::new("1", start, title)
    }

    fn check(title: &str, tags: &[&str], mode: BoolMode) -> bool {
        tag_match(&entry(title), &TagQuery::new(tags.iter().copied(), mode), false, &AlwaysFinishable)
    }

    #[test]
    fn and_or_not() {
        let t = "Write report @work @urgent";
        assert!(check(t, &["work", "urgent"], BoolMode::And));
        assert!(!check(t, &["work", "missing"], BoolMode::And));
        assert!(!check(t, &["missing"], BoolMode::Or));
        assert!(check(t, &["missing", "urgent"], BoolMode::Or));
        assert!(!check(t, &["work"], BoolMode::Not));
        assert!(check(t, &["missing"], BoolMode::Not));
    }

    #[test]
    fn names_are_case_insensitive_and_wildcard_aware() {
        let t = "Call @Client(Acme) @waiting";
        assert!(check(t, &["@client"], BoolMode::And));
        assert!(check(t, &["wait*"], BoolMode::And));
        assert!(check(t, &["cl?ent"], BoolMode::And));
        assert!(!check(t, &["wait"], BoolMode::And));
    }

    #[test]
    fn empty_list_is_vacuously_true() {
        let e = entry("no tags here");
        let q = TagQuery::new(Vec::<String>::new(), BoolMode::And);
        assert!(tag_match(&e, &q, false, &AlwaysFinishable));
        assert!(tag_match(&e, &q, true, &AlwaysFinishable));
    }

    #[test]
    fn negate_flips_result() {
        let e = entry("Task @work");
        let q = TagQuery::new(["work"], BoolMode::And);
        assert!(!tag_match(&e, &q, true, &AlwaysFinishable));
    }

    #[test]
    fn pattern_mode() {
        let t = "Fix bug @work @urgent";
        assert!(check(t, &["+work -home"], BoolMode::Pattern));
        assert!(!check(t, &["+work -urgent"], BoolMode::Pattern));
        assert!(check(t, &["+work", "meeting"], BoolMode::Pattern));
        assert!(!check(t, &["-home meeting"], BoolMode::Pattern));
        assert!(check(t, &["-home urgent"], BoolMode::Pattern));
        assert!(check(t, &["work urgent"], BoolMode::Pattern));
    }

    #[test]
    fn done_exemption_for_unfinishable_entries() {
        let e = entry("Standup @meeting");
        let never = NeverFinish::new(["@meeting"]);

        let and = TagQuery::new(["done", "meeting"], BoolMode::And);
        assert!(tag_match(&e, &and, false, &never));
        assert!(!tag_match(&e, &and, false, &AlwaysFinishable));

        let or = TagQuery::new(["done"], BoolMode::Or);
        assert!(tag_match(&e, &or, false, &never));

        let not = TagQuery::new(["done"], BoolMode::Not);
        assert!(!tag_match(&e, &not, false, &never));
        assert!(tag_match(&e, &not, false, &AlwaysFinishable));
    }

    #[test]
    fn never_finish_sections_and_closures() {
        let never = NeverFinish::new(["Ideas", "@meeting", "  "]);
        assert!(!never.is_finishable(&entry("x").with_section("ideas")));
        assert!(never.is_finishable(&entry("x @work")));

        let closure = |e: &Entry| !e.title.contains("forever");
        assert!(!closure.is_finishable(&entry("forever task")));
    }

    #[test]
    fn parse_splits_commas_and_spaces() {
        let q = TagQuery::parse(&["@work, urgent", "home"], BoolMode::Or);
        assert_eq!(q.tags, vec!["@work", "urgent", "home"]);
    }

    #[test]
    fn bool_mode_from_str() {
        assert_eq!("AND".parse::<BoolMode>(), Ok(BoolMode::And));
        assert_eq!("any".parse::<BoolMode>(), Ok(BoolMode::Or));
        assert_eq!("pattern".parse::<BoolMode>(), Ok(BoolMode::Pattern));
        assert!("xor".parse::<BoolMode>().is_err());
    }
}
