//! Per-chunk result caching
//!
//! ## cache/ Invariants
//!
//! - A cached entry is keyed by `(chunk_index, chunk item count)`; a chunk
//!   growing invalidates its own entry implicitly, since the count no longer
//!   matches (no explicit invalidation needed on append).
//! - Only selective results are retained: a chunk scan that matched more than
//!   [`SELECTIVITY_GATE`] items is not cached, since a broader result set is
//!   cheap to recompute and expensive to keep around.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::merger::MatchedItem;

pub mod merger_cache;

/// Maximum result-set size worth caching per chunk.
const SELECTIVITY_GATE: usize = 20;

#[derive(Clone)]
struct Entry {
    query: String,
    count: u32,
    results: Vec<MatchedItem>,
}

/// One cached entry per chunk index, keyed additionally by the chunk's item
/// count at cache time so growth invalidates silently.
pub struct ChunkCache {
    entries: RwLock<HashMap<usize, Entry>>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Exact hit: same chunk, same chunk size, same query text.
    pub fn lookup(&self, chunk_index: usize, count: u32, query: &str) -> Option<Vec<MatchedItem>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&chunk_index).and_then(|e| {
            if e.count == count && e.query == query {
                Some(e.results.clone())
            } else {
                None
            }
        })
    }

    /// A cached entry whose query is a strict prefix of `query` at the same
    /// chunk size: its (already selective) results are a valid narrower
    /// search space, avoiding a full chunk rescan.
    pub fn search(&self, chunk_index: usize, count: u32, query: &str) -> Option<Vec<MatchedItem>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&chunk_index).and_then(|e| {
            if e.count == count && !e.query.is_empty() && query.len() > e.query.len() && query.starts_with(&e.query) {
                Some(e.results.clone())
            } else {
                None
            }
        })
    }

    /// Cache `results` for `(chunk_index, count, query)` if selective enough.
    pub fn store(&self, chunk_index: usize, count: u32, query: &str, results: Vec<MatchedItem>) {
        if results.len() > SELECTIVITY_GATE {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            chunk_index,
            Entry {
                query: query.to_string(),
                count,
                results,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new()
    }
}
