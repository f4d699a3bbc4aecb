//! Ordering search hits by how well they match.

use crate::entry::Entry;

use super::wildcard::{CaseMode, DEFAULT_FUZZY_DISTANCE, compile_fuzzy, compile_literal};

/// Relevance of a hit. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(pub i64);

/// Fuzzy-ranking capability.
///
/// Returns `None` when `text` does not match `query` at all.
pub trait Ranker: Send + Sync {
    fn rank(&self, text: &str, query: &str) -> Option<Score>;
}

/// In-process ranker built on the interleave matcher.
///
/// Contiguous matches beat scattered ones, and earlier matches beat later ones.
#[derive(Debug, Clone, Copy)]
pub struct InterleaveRanker {
    pub distance: usize,
    pub case: CaseMode,
}

impl Default for InterleaveRanker {
    fn default() -> Self {
        Self { distance: DEFAULT_FUZZY_DISTANCE, case: CaseMode::Smart }
    }
}

const EXACT_BONUS: i64 = 10_000;
const GAP_PENALTY: i64 = 100;

impl Ranker for InterleaveRanker {
    fn rank(&self, text: &str, query: &str) -> Option<Score> {
        let wanted: usize = query.chars().filter(|c| !c.is_whitespace()).count();
        if wanted == 0 {
            return Some(Score(0));
        }

        if let Some((start, _)) = compile_literal(query.trim(), self.case).find(text) {
            return Some(Score(EXACT_BONUS - position(text, start)));
        }

        let (start, end) = compile_fuzzy(query, self.distance, self.case).find(text)?;
        let span = text[start..end].chars().count();
        let gaps = span.saturating_sub(wanted) as i64;
        Some(Score(-gaps * GAP_PENALTY - position(text, start)))
    }
}

fn position(text: &str, byte_offset: usize) -> i64 {
    text[..byte_offset].chars().count() as i64
}

/// Keep the entries `ranker` scores, best first.
///
/// Ties keep their input order.
pub fn rank_entries(entries: &[Entry], query: &str, ranker: &dyn Ranker) -> Vec<Entry> {
    let mut scored: Vec<(Score, &Entry)> = entries
        .iter()
        .filter_map(|e| ranker.rank(&e.search_text(), query).map(|s| (s, e)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    tracing::debug!(query = %query, hits = scored.len(), total = entries.len(), "ranked entries");
    scored.into_iter().map(|(_, e)| e.clone()).collect()
}
