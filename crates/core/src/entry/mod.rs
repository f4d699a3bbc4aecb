//! Log entries and the tags embedded in their titles.
//!
//! Tags are not stored separately: they are `@name` or `@name(value)`
//! annotations inside the title. [`extract_tags`] is the single place that
//! knows how to read them, and both tag matching and value comparison go
//! through it.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tag marking an entry as finished; its value is the end timestamp.
pub const DONE_TAG: &str = "done";

/// Section assigned to entries that do not name one.
pub const DEFAULT_SECTION: &str = "Currently";

// A tag starts the title or follows whitespace. Its name ends at whitespace,
// an opening parenthesis or trailing punctuation.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)@([^\s(),.;:!?]+)(?:\(([^)]*)\))?").unwrap());

/// A single entry in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable opaque identity.
    pub id: String,
    /// When the entry was started.
    pub start_time: NaiveDateTime,
    /// Title text, including any embedded tags.
    pub title: String,
    /// Note lines attached to the entry.
    #[serde(default)]
    pub note: Vec<String>,
    /// Section label the entry lives in.
    #[serde(default = "default_section")]
    pub section: String,
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

/// A tag read from an entry title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the leading `@`, as written.
    pub name: String,
    /// Parenthetical value, verbatim. `None` when the tag has no parentheses.
    pub value: Option<String>,
}

impl Tag {
    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim_start_matches('@'))
    }
}

/// Extract every `@name` / `@name(value)` annotation from a title, in order.
pub fn extract_tags(title: &str) -> Vec<Tag> {
    TAG_RE
        .captures_iter(title)
        .map(|caps| Tag {
            name: caps[1].to_string(),
            value: caps.get(2).map(|m| m.as_str().to_string()),
        })
        .collect()
}

impl Entry {
    /// Create an entry in the default section with no note.
    pub fn new(
        id: impl Into<String>,
        start_time: NaiveDateTime,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            title: title.into(),
            note: Vec::new(),
            section: default_section(),
        }
    }

    /// Builder: attach note lines.
    pub fn with_note<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.note = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: move the entry into a section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Tags embedded in the title.
    pub fn tags(&self) -> Vec<Tag> {
        extract_tags(&self.title)
    }

    /// Whether the title carries a tag with this exact name (case-insensitive).
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags().iter().any(|t| t.is_named(name))
    }

    /// Value of the first tag with this name.
    ///
    /// Returns `None` when the tag is absent, and an empty string when the tag
    /// is present without a parenthetical value.
    pub fn tag_value(&self, name: &str) -> Option<String> {
        self.tags()
            .into_iter()
            .find(|t| t.is_named(name))
            .map(|t| t.value.unwrap_or_default())
    }

    /// Note lines joined with newlines.
    pub fn note_text(&self) -> String {
        self.note.join("\n")
    }

    /// Title followed by the note, the haystack for free-text search.
    pub fn search_text(&self) -> String {
        if self.note.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.note_text())
        }
    }

    /// Calendar day the entry started on.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// End time read from the `@done(...)` tag.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        let value = self.tag_value(DONE_TAG)?;
        let parsed = parse_done_value(&value);
        if parsed.is_none() && !value.trim().is_empty() {
            tracing::warn!(id = %self.id, value = %value, "unreadable @done timestamp");
        }
        parsed
    }

    /// Elapsed seconds between start and end, if the entry has a usable end.
    pub fn duration(&self) -> Option<i64> {
        let end = self.end_time()?;
        let secs = (end - self.start_time).num_seconds();
        (secs >= 0).then_some(secs)
    }
}

fn parse_done_value(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn extracts_names_and_values() {
        let tags = extract_tags("Write report @work @progress(75%) @due()");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0], Tag { name: "work".into(), value: None });
        assert_eq!(tags[1], Tag { name: "progress".into(), value: Some("75%".into()) });
        assert_eq!(tags[2], Tag { name: "due".into(), value: Some(String::new()) });
    }

    #[test]
    fn ignores_embedded_at_signs() {
        let tags = extract_tags("mail bob@example.com about @lunch");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "lunch");
    }

    #[test]
    fn trailing_punctuation_is_not_part_of_the_name() {
        let names: Vec<String> = extract_tags("Call @client, then @lunch. Ask @bob? @urgent!")
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["client", "lunch", "bob", "urgent"]);

        let e = Entry::new("1", at("2023-01-01 09:00"), "Pay @due(2023-01-05); then rest");
        assert_eq!(e.tag_value("due").as_deref(), Some("2023-01-05"));
    }

    #[test]
    fn preserves_value_verbatim() {
        let e = Entry::new("1", at("2023-01-01 09:00"), "Call @client( Acme Corp )");
        assert_eq!(e.tag_value("CLIENT").as_deref(), Some(" Acme Corp "));
        assert_eq!(e.tag_value("missing"), None);
    }

    #[test]
    fn duration_from_done_tag() {
        let e = Entry::new("1", at("2023-01-01 09:00"), "Task @done(2023-01-01 09:45)");
        assert_eq!(e.end_time(), Some(at("2023-01-01 09:45")));
        assert_eq!(e.duration(), Some(45 * 60));

        let open = Entry::new("2", at("2023-01-01 09:00"), "Task @done");
        assert_eq!(open.duration(), None);

        let backwards = Entry::new("3", at("2023-01-01 09:00"), "Task @done(2022-12-31 09:00)");
        assert_eq!(backwards.duration(), None);
    }

    #[test]
    fn search_text_joins_title_and_note() {
        let e = Entry::new("1", at("2023-01-01 09:00"), "Title").with_note(["one", "two"]);
        assert_eq!(e.search_text(), "Title\none\ntwo");
    }
}
