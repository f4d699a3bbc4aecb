//! Shared output formatting for listing commands.

use jotlog_core::entry::Entry;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::OutputFormat;

const TITLE_WIDTH: usize = 60;

/// Formatted entry for JSON output.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub id: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
    pub section: String,
    pub title: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<String>,
}

impl From<&Entry> for EntryOutput {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            start: entry.start_time.format("%Y-%m-%d %H:%M").to_string(),
            end: entry.end_time().map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            duration_secs: entry.duration(),
            section: entry.section.clone(),
            title: entry.title.clone(),
            tags: entry.tags().into_iter().map(|t| t.name).collect(),
            note: entry.note.clone(),
        }
    }
}

/// Row for the entries table.
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

impl From<&Entry> for EntryRow {
    fn from(entry: &Entry) -> Self {
        Self {
            start: entry.start_time.format("%Y-%m-%d %H:%M").to_string(),
            section: entry.section.clone(),
            title: truncate(&entry.title, TITLE_WIDTH),
            duration: entry.duration().map(format_duration).unwrap_or_default(),
        }
    }
}

/// Print entries in the requested format.
pub fn print_entries(entries: &[Entry], format: OutputFormat) {
    match format {
        OutputFormat::Table => print_entries_table(entries),
        OutputFormat::Json => print_entries_json(entries),
        OutputFormat::Quiet => print_entries_quiet(entries),
    }
}

fn print_entries_table(entries: &[Entry]) {
    if entries.is_empty() {
        println!("(no entries found)");
        return;
    }

    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!();
    println!("-- {} entries --", entries.len());
}

fn print_entries_json(entries: &[Entry]) {
    let output: Vec<EntryOutput> = entries.iter().map(EntryOutput::from).collect();
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

fn print_entries_quiet(entries: &[Entry]) {
    for entry in entries {
        println!("{}", entry.title);
    }
}

/// Resolve the output format from flags.
pub fn resolve_format(output: OutputFormat, json: bool) -> OutputFormat {
    if json { OutputFormat::Json } else { output }
}

/// `1h05m`, `45m`, `2d03h`.
pub fn format_duration(secs: i64) -> String {
    let minutes = secs / 60;
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    match (days, hours) {
        (0, 0) => format!("{mins}m"),
        (0, _) => format!("{hours}h{mins:02}m"),
        _ => format!("{days}d{hours:02}h"),
    }
}

/// Truncate string with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
