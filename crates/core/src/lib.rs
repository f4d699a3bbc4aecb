//! Query and filter engine for a personal log of timestamped, tagged entries.
//!
//! Entries carry their tags inline (`Write report @work @progress(75%)`).
//! The engine slices a log by section, tag presence, tag value, free text
//! and time, and returns a deterministic newest-first subset:
//!
//! ```
//! use chrono::NaiveDateTime;
//! use jotlog_core::chronify::NaturalChronify;
//! use jotlog_core::config::SearchConfig;
//! use jotlog_core::entry::Entry;
//! use jotlog_core::filter::{Filter, FilterOptions};
//! use jotlog_core::query::AlwaysFinishable;
//!
//! let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
//! let log = vec![
//!     Entry::new("1", at("2023-01-01 09:00"), "Write report @work"),
//!     Entry::new("2", at("2023-01-02 09:00"), "Groceries @home"),
//! ];
//!
//! let chronify = NaturalChronify::new(at("2023-01-03 12:00"));
//! let filter = Filter::new(&chronify, &AlwaysFinishable, SearchConfig::default());
//! let options = FilterOptions { tag: vec!["work".into()], ..Default::default() };
//!
//! let hits = filter.run(&log, &options).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, "1");
//! ```

pub mod chronify;
pub mod config;
pub mod entry;
pub mod errors;
pub mod filter;
pub mod query;

pub use entry::{Entry, Tag, extract_tags};
pub use errors::FilterError;
pub use filter::{Filter, FilterOptions, FilterSpec};
pub use query::{tag_match, value_match};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
