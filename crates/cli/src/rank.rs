//! Ranking through an external filter program such as `fzf --filter`.
//!
//! The program receives one candidate per line on stdin, with the query as
//! its last argument, and prints the matching lines best first.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use jotlog_core::config::SearchConfig;
use jotlog_core::entry::Entry;
use jotlog_core::query::{InterleaveRanker, rank_entries};

/// Ranker named in `[search].ranker`.
pub enum SearchRanker {
    Builtin(InterleaveRanker),
    Command(CommandRanker),
}

impl SearchRanker {
    pub fn from_config(search: &SearchConfig) -> Self {
        let spec = search.ranker.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("builtin") {
            return SearchRanker::Builtin(InterleaveRanker {
                distance: search.distance,
                case: search.case,
            });
        }
        match CommandRanker::parse(spec) {
            Some(command) => SearchRanker::Command(command),
            None => SearchRanker::Builtin(InterleaveRanker::default()),
        }
    }

    pub fn rank(&self, entries: &[Entry], query: &str) -> io::Result<Vec<Entry>> {
        match self {
            SearchRanker::Builtin(ranker) => Ok(rank_entries(entries, query, ranker)),
            SearchRanker::Command(command) => command.rank(entries, query),
        }
    }
}

/// External program invoked once per query.
#[derive(Debug, Clone)]
pub struct CommandRanker {
    program: String,
    args: Vec<String>,
}

impl CommandRanker {
    /// Split a command line on whitespace. No shell quoting is applied.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }

    pub fn rank(&self, entries: &[Entry], query: &str) -> io::Result<Vec<Entry>> {
        let input: String = entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{i}\t{}\n", one_line(&e.search_text())))
            .collect();

        tracing::debug!(program = %self.program, candidates = entries.len(), "running external ranker");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(query)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("ranker stdin unavailable"))?;

        // Feed stdin on its own thread so a full stdout pipe cannot stall us.
        let output = thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            match writer.join() {
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => output,
            }
        })?;

        // grep and fzf both exit 1 when nothing matched
        if !output.status.success() && output.status.code() != Some(1) {
            return Err(io::Error::other(format!(
                "ranker '{}' exited with {}",
                self.program, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .filter_map(|(idx, _)| idx.parse::<usize>().ok())
            .filter_map(|i| entries.get(i).cloned())
            .collect())
    }
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
