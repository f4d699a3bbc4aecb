//! Raw filter options, as a caller collects them from flags or config.

use std::fmt;
use std::str::FromStr;

use crate::query::{BoolMode, CaseMode, SearchMatching, TagQuery};

/// Which end of the filtered list `count` keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Age {
    #[default]
    Newest,
    Oldest,
}

impl FromStr for Age {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "new" | "n" => Ok(Age::Newest),
            "oldest" | "old" | "o" => Ok(Age::Oldest),
            other => Err(format!("unknown age: {other}")),
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Age::Newest => "newest",
            Age::Oldest => "oldest",
        })
    }
}

/// Unresolved filter options.
///
/// Every field is optional; the default value filters nothing and returns
/// the whole log in canonical order.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Section label prefix. Empty or `All` disables the section filter.
    pub section: Option<String>,
    /// Tag names, comma or space separated, with or without `@`.
    pub tag: Vec<String>,
    /// Combination mode for `tag` and `val`.
    pub bool_mode: BoolMode,
    /// `[!]field op value` queries.
    pub val: Vec<String>,
    pub search: Option<String>,
    /// Overrides the configured case mode.
    pub case: Option<CaseMode>,
    /// Overrides the configured matching mode.
    pub matching: Option<SearchMatching>,
    /// `(start, end)` date expressions; a missing end means the start's day.
    pub date_filter: Option<(String, Option<String>)>,
    /// `(start, end)` clock times applied to each entry's own day.
    pub time_filter: Option<(Option<String>, Option<String>)>,
    /// `"X"` or `"X to Y"`; used when neither `date_filter` nor `time_filter` is set.
    pub from: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub only_timed: bool,
    pub today: bool,
    pub yesterday: bool,
    pub unfinished: bool,
    /// Invert every active stage.
    pub negate: bool,
    /// A tag query resolved by the caller, applied after `tag`.
    pub tag_filter: Option<TagQuery>,
    /// Maximum number of results; 0 is unlimited.
    pub count: usize,
    pub age: Age,
}
