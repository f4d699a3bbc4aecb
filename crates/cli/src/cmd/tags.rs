//! `jot tags`: tag usage across the log.

use std::collections::BTreeMap;
use std::path::Path;

use jotlog_core::entry::Entry;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use super::open_log;
use crate::TagsArgs;

#[derive(Debug, Serialize, Tabled)]
struct TagCount {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Count entries per tag name. Names are folded to lowercase; an entry
/// counts once per tag however often it repeats it.
fn count_tags(entries: &[Entry]) -> Vec<TagCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        let mut names: Vec<String> =
            entry.tags().into_iter().map(|t| t.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        for name in names {
            *counts.entry(name).or_default() += 1;
        }
    }
    counts.into_iter().map(|(tag, count)| TagCount { tag, count }).collect()
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: TagsArgs) {
    let log = open_log(config, profile);

    let mut tags = count_tags(&log.entries);
    if args.by_count {
        // stable: ties stay alphabetical
        tags.sort_by(|a, b| b.count.cmp(&a.count));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tags).unwrap_or_default());
        return;
    }

    if tags.is_empty() {
        println!("(no tags found)");
        return;
    }
    let table = Table::new(&tags).with(Style::rounded()).to_string();
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn counts_each_entry_once_per_tag() {
        let start = NaiveDateTime::parse_from_str("2023-01-01 09:00", "%Y-%m-%d %H:%M").unwrap();
        let entries = vec![
            Entry::new("1", start, "a @Work @work @home"),
            Entry::new("2", start, "b @work"),
        ];
        let counts = count_tags(&entries);
        let pairs: Vec<_> = counts.iter().map(|t| (t.tag.as_str(), t.count)).collect();
        assert_eq!(pairs, vec![("home", 1), ("work", 2)]);
    }
}
