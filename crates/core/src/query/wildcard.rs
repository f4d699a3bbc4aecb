//! Compiling glob-like, fuzzy, and raw-regex query fragments into matchers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Default number of extra characters tolerated between fuzzy query characters.
pub const DEFAULT_FUZZY_DISTANCE: usize = 3;

// Never matches; stands in when a pattern exceeds the regex size limit.
static NEVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\B").unwrap());

/// Case sensitivity of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Sensitive,
    Ignore,
    /// Ignore case unless the pattern contains an uppercase letter.
    #[default]
    Smart,
}

impl CaseMode {
    /// Whether matching `pattern` under this mode should ignore case.
    pub fn ignores_case(self, pattern: &str) -> bool {
        match self {
            CaseMode::Sensitive => false,
            CaseMode::Ignore => true,
            CaseMode::Smart => !has_uppercase_literal(pattern),
        }
    }

    /// Settle `Smart` against `pattern`, for queries compiled piece by piece.
    pub fn resolve(self, pattern: &str) -> CaseMode {
        if self.ignores_case(pattern) { CaseMode::Ignore } else { CaseMode::Sensitive }
    }
}

impl FromStr for CaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sensitive" | "s" | "c" | "case" => Ok(CaseMode::Sensitive),
            "ignore" | "i" | "insensitive" => Ok(CaseMode::Ignore),
            "smart" => Ok(CaseMode::Smart),
            other => Err(format!("unknown case mode: {other}")),
        }
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseMode::Sensitive => "sensitive",
            CaseMode::Ignore => "ignore",
            CaseMode::Smart => "smart",
        })
    }
}

// Escaped characters such as `\S` or `\W` are regex syntax, not letters.
fn has_uppercase_literal(pattern: &str) -> bool {
    let mut escaped = false;
    for c in pattern.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c.is_uppercase() {
            return true;
        }
    }
    false
}

/// A compiled query fragment.
#[derive(Debug, Clone)]
pub struct Matcher(Regex);

impl Matcher {
    /// Whether the matcher finds a match anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// Byte range of the leftmost match.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.0.find(text).map(|m| (m.start(), m.end()))
    }

    /// The regex source this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn build(source: &str, ignore_case: bool) -> Result<Matcher, regex::Error> {
    RegexBuilder::new(source).case_insensitive(ignore_case).build().map(Matcher)
}

// Only escaped input reaches here, so the sole failure is the size limit.
fn build_escaped(source: &str, ignore_case: bool) -> Matcher {
    build(source, ignore_case).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "query pattern too large; it will match nothing");
        Matcher(NEVER.clone())
    })
}

/// Translate a wildcard pattern into a regex fragment.
///
/// `*` becomes `any`, `?` becomes `one`, every other character is escaped.
pub(crate) fn wildcard_fragment(pattern: &str, any: &str, one: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(any),
            '?' => out.push_str(one),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out
}

/// Compile a wildcard pattern that matches anywhere in the text.
pub fn compile_wildcard(pattern: &str, case: CaseMode) -> Matcher {
    let source = wildcard_fragment(pattern, "(?s:.*)", "(?s:.)");
    build_escaped(&source, case.ignores_case(pattern))
}

/// Compile a wildcard pattern that must match the whole text.
pub fn compile_anchored_wildcard(pattern: &str, case: CaseMode) -> Matcher {
    let source = format!("^{}$", wildcard_fragment(pattern, "(?s:.*)", "(?s:.)"));
    build_escaped(&source, case.ignores_case(pattern))
}

/// Compile a tag name pattern, matched against a whole tag name.
///
/// Tag names are compared case-insensitively, and a wildcard never
/// crosses whitespace or an opening parenthesis.
pub fn compile_tag_name(pattern: &str) -> Matcher {
    let name = pattern.trim().trim_start_matches('@');
    let source = format!("^{}$", wildcard_fragment(name, r"[^\s(]*", r"[^\s(]"));
    build_escaped(&source, true)
}

/// Compile a typo-tolerant matcher.
///
/// Up to `distance` arbitrary characters may appear between consecutive
/// characters of `query`; whitespace in the query is ignored.
pub fn compile_fuzzy(query: &str, distance: usize, case: CaseMode) -> Matcher {
    let gap = format!("(?s:.){{0,{distance}}}?");
    let mut buf = [0u8; 4];
    let source = query
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(c.encode_utf8(&mut buf)))
        .collect::<Vec<_>>()
        .join(&gap);
    build_escaped(&source, case.ignores_case(query))
}

/// Whether `query` is a slash-delimited raw regex, e.g. `/colou?r/`.
pub fn is_raw_regex(query: &str) -> bool {
    let q = query.trim();
    q.len() > 2 && q.starts_with('/') && q.ends_with('/')
}

/// Compile a slash-delimited raw regex.
///
/// An invalid expression never fails the query: it is matched literally instead.
pub fn compile_raw_regex(query: &str, case: CaseMode) -> Matcher {
    let q = query.trim();
    let inner = q.strip_prefix('/').and_then(|s| s.strip_suffix('/')).unwrap_or(q);
    let ignore_case = case.ignores_case(inner);
    build(inner, ignore_case).unwrap_or_else(|e| {
        tracing::warn!(pattern = %inner, error = %e, "invalid regex; matching it literally");
        build_escaped(&regex::escape(inner), ignore_case)
    })
}

/// Compile an exact phrase bounded by non-word characters or the text ends.
pub fn compile_literal_phrase(phrase: &str, case: CaseMode) -> Matcher {
    let source = format!(r"(?:^|[^\w]){}(?:[^\w]|$)", regex::escape(phrase));
    build_escaped(&source, case.ignores_case(phrase))
}

/// Compile a literal substring matcher (no wildcards).
pub fn compile_literal(text: &str, case: CaseMode) -> Matcher {
    build_escaped(&regex::escape(text), case.ignores_case(text))
}
