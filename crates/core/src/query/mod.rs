//! Query building blocks: pattern compilation, phrase parsing, tag and
//! value predicates, ranking.

pub mod phrase;
pub mod rank;
pub mod tags;
pub mod value;
pub mod wildcard;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub use phrase::{CompiledPhrase, PhraseQuery, Term, parse_phrase};
pub use rank::{InterleaveRanker, Ranker, Score, rank_entries};
pub use tags::{
    AlwaysFinishable, BoolMode, Finishable, NeverFinish, TagMatcher, TagQuery, split_tags,
    tag_match,
};
pub use value::{Comparator, ValueQuery, value_match};
pub use wildcard::{CaseMode, DEFAULT_FUZZY_DISTANCE, Matcher};

/// How a free-text search string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMatching {
    /// Phrase query syntax (`+must -not 'exact /re/`).
    #[default]
    Pattern,
    /// The whole string as one literal substring.
    Exact,
    /// Typo-tolerant interleave match.
    Fuzzy,
}

impl FromStr for SearchMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pattern" => Ok(SearchMatching::Pattern),
            "exact" => Ok(SearchMatching::Exact),
            "fuzzy" => Ok(SearchMatching::Fuzzy),
            other => Err(format!("unknown matching mode: {other}")),
        }
    }
}

impl fmt::Display for SearchMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMatching::Pattern => "pattern",
            SearchMatching::Exact => "exact",
            SearchMatching::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}
