//! Splitting a search string into required, forbidden, and optional terms.
//!
//! Syntax:
//! - `word` optional term
//! - `+word` required term
//! - `-word` or `!word` excluded term
//! - `'word` or `"several words"` exact phrase, matched on word boundaries
//! - `/pattern/` raw regex
//!
//! Parsing never fails. A token that cannot be read (an unterminated quote,
//! a bare prefix) becomes a literal optional term.

use super::wildcard::{
    CaseMode, Matcher, compile_literal_phrase, compile_raw_regex, compile_wildcard,
    is_raw_regex,
};

/// One search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Wildcard-aware substring.
    Literal(String),
    /// Exact phrase bounded by non-word characters or the ends of the text.
    Phrase(String),
    /// Raw regex, without the surrounding slashes.
    Regex(String),
}

impl Term {
    /// The term text as the user wrote it, minus syntax.
    pub fn text(&self) -> &str {
        match self {
            Term::Literal(s) | Term::Phrase(s) | Term::Regex(s) => s,
        }
    }

    /// Compile for matching against free text.
    pub fn compile(&self, case: CaseMode) -> Matcher {
        match self {
            Term::Literal(s) => compile_wildcard(s, case),
            Term::Phrase(s) => compile_literal_phrase(s, case),
            Term::Regex(s) => compile_raw_regex(&format!("/{s}/"), case),
        }
    }
}

/// A parsed search string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseQuery {
    pub must: Vec<Term>,
    pub should: Vec<Term>,
    pub must_not: Vec<Term>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occur {
    Must,
    Should,
    MustNot,
}

impl PhraseQuery {
    /// True when the query has no terms at all.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Whether optional terms must contribute a match.
    ///
    /// Once a required term exists, optional terms no longer filter.
    pub fn requires_should(&self) -> bool {
        self.must.is_empty() && !self.should.is_empty()
    }

    /// Compile every term for matching against free text.
    ///
    /// Smart case is settled once for the whole query, so one uppercase
    /// letter anywhere makes every term case-sensitive.
    pub fn compile(&self, case: CaseMode) -> CompiledPhrase {
        let all_text: Vec<&str> =
            self.must.iter().chain(&self.should).chain(&self.must_not).map(Term::text).collect();
        let case = case.resolve(&all_text.join(" "));
        let compile_all =
            |terms: &[Term]| -> Vec<Matcher> { terms.iter().map(|t| t.compile(case)).collect() };
        CompiledPhrase {
            must: compile_all(&self.must),
            should: compile_all(&self.should),
            must_not: compile_all(&self.must_not),
            requires_should: self.requires_should(),
        }
    }

    fn push(&mut self, occur: Occur, term: Term) {
        match occur {
            Occur::Must => self.must.push(term),
            Occur::Should => self.should.push(term),
            Occur::MustNot => self.must_not.push(term),
        }
    }
}

/// A phrase query ready to run against text.
#[derive(Debug, Clone)]
pub struct CompiledPhrase {
    must: Vec<Matcher>,
    should: Vec<Matcher>,
    must_not: Vec<Matcher>,
    requires_should: bool,
}

impl CompiledPhrase {
    /// `no_match(must_not) AND all_match(must) AND any_match(should)`,
    /// where the last clause only applies when nothing is required.
    pub fn matches(&self, text: &str) -> bool {
        !self.must_not.iter().any(|m| m.is_match(text))
            && self.must.iter().all(|m| m.is_match(text))
            && (!self.requires_should || self.should.iter().any(|m| m.is_match(text)))
    }
}

/// Parse a search string.
///
/// If nothing is marked required or excluded, every optional term becomes
/// required, so `urgent report` means "urgent AND report".
pub fn parse_phrase(raw: &str) -> PhraseQuery {
    let mut query = PhraseQuery::default();
    let chars: Vec<char> = raw.chars().collect();
    let len = chars.len();
    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    let word_end = |from: usize| {
        (from..len).find(|&j| chars[j].is_whitespace()).unwrap_or(len)
    };

    let mut i = 0;
    while i < len {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let occur = match chars[i] {
            '+' => Occur::Must,
            '-' | '!' => Occur::MustNot,
            _ => Occur::Should,
        };
        if occur != Occur::Should {
            i += 1;
        }

        if i >= len || chars[i].is_whitespace() {
            query.push(Occur::Should, Term::Literal(slice(start, i)));
            continue;
        }

        if chars[i] == '"' {
            match (i + 1..len).find(|&j| chars[j] == '"') {
                Some(close) => {
                    let phrase = slice(i + 1, close);
                    i = close + 1;
                    if !phrase.trim().is_empty() {
                        query.push(occur, Term::Phrase(phrase));
                    }
                }
                None => {
                    let end = word_end(i);
                    query.push(Occur::Should, Term::Literal(slice(start, end)));
                    i = end;
                }
            }
            continue;
        }

        let end = word_end(i);
        let word = slice(i, end);
        i = end;

        if let Some(exact) = word.strip_prefix('\'') {
            let exact = exact.strip_suffix('\'').unwrap_or(exact);
            if exact.is_empty() {
                query.push(Occur::Should, Term::Literal(slice(start, end)));
            } else {
                query.push(occur, Term::Phrase(exact.to_string()));
            }
        } else if is_raw_regex(&word) {
            query.push(occur, Term::Regex(word[1..word.len() - 1].to_string()));
        } else {
            query.push(occur, Term::Literal(word));
        }
    }

    if query.must.is_empty() && query.must_not.is_empty() {
        query.must = std::mem::take(&mut query.should);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Term {
        Term::Literal(s.to_string())
    }

    #[test]
    fn bare_words_default_to_required() {
        let q = parse_phrase("urgent report");
        assert_eq!(q.must, vec![lit("urgent"), lit("report")]);
        assert!(q.should.is_empty());
        assert!(q.must_not.is_empty());
    }

    #[test]
    fn prefixes_sort_terms() {
        let q = parse_phrase("+urgent -draft !memo report");
        assert_eq!(q.must, vec![lit("urgent")]);
        assert_eq!(q.must_not, vec![lit("draft"), lit("memo")]);
        assert_eq!(q.should, vec![lit("report")]);
    }

    #[test]
    fn quoted_and_exact_terms() {
        let q = parse_phrase("+\"weekly sync\" 'bug -/fix(ed)?/");
        assert_eq!(q.must, vec![Term::Phrase("weekly sync".into())]);
        assert_eq!(q.should, vec![Term::Phrase("bug".into())]);
        assert_eq!(q.must_not, vec![Term::Regex("fix(ed)?".into())]);
    }

    #[test]
    fn malformed_tokens_degrade_to_optional_literals() {
        let q = parse_phrase("-draft \"unterminated + '");
        assert_eq!(q.must_not, vec![lit("draft")]);
        assert_eq!(q.should, vec![lit("\"unterminated"), lit("+"), lit("'")]);
        assert!(q.must.is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(parse_phrase("   ").is_empty());
        assert!(parse_phrase("").is_empty());
    }

    #[test]
    fn default_and_matching() {
        let q = parse_phrase("urgent report").compile(CaseMode::Smart);
        assert!(q.matches("Write urgent report now"));
        assert!(!q.matches("Write urgent note"));
    }

    #[test]
    fn mixed_boolean_matching() {
        let q = parse_phrase("+urgent -draft report").compile(CaseMode::Smart);
        assert!(q.matches("urgent report"));
        assert!(!q.matches("urgent draft report"));
        assert!(q.matches("urgent memo"));
    }

    #[test]
    fn should_terms_filter_when_nothing_is_required() {
        let q = parse_phrase("-draft report memo").compile(CaseMode::Smart);
        assert!(q.matches("a report"));
        assert!(q.matches("a memo"));
        assert!(!q.matches("a letter"));
        assert!(!q.matches("a draft report"));
    }

    #[test]
    fn smart_case_applies_to_the_whole_query() {
        let q = parse_phrase("Report urgent").compile(CaseMode::Smart);
        assert!(q.matches("Report urgent"));
        assert!(!q.matches("Report URGENT"));

        let q = parse_phrase("report urgent").compile(CaseMode::Smart);
        assert!(q.matches("REPORT Urgent"));
    }

    #[test]
    fn exact_phrase_respects_word_boundaries() {
        let q = parse_phrase("'port").compile(CaseMode::Smart);
        assert!(q.matches("port of call"));
        assert!(q.matches("the port."));
        assert!(!q.matches("report"));
    }
}
