//! Ranked result materialization: packed sort keys and lazy k-way merge
//!
//! ## merger/ Invariants
//!
//! - `points` orders candidates ascending: a smaller packed value is a better
//!   match. This lets every comparison collapse to a single `u64 <` plus an
//!   `item.index` tiebreak, with no per-field branching at sort time.
//! - A [`ResultMerger::ChunkBacked`] merge only runs once per instance, on
//!   first read; repeated `get`/`slice` calls reuse the cached merge.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::scheme::Scheme;
use crate::store::{Item, Snapshot};

/// One ranked candidate: the underlying item, its raw kernel score, the
/// byte offset its match begins at, and the packed comparison key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedItem {
    pub item: Item,
    pub raw_score: i16,
    pub min_begin: u16,
    pub points: u64,
}

fn last_path_separator_before(text: &[u8], min_begin: u16) -> Option<usize> {
    let end = (min_begin as usize).min(text.len());
    text[..end].iter().rposition(|&b| b == b'/' || b == b'\\')
}

/// Build the packed rank key: `byScore | byPathname | byLength | reserved`,
/// 16 bits each from MSB to LSB. Which of `byPathname`/`byLength` carry real
/// information depends on `scheme`; the rest are zeroed so they never
/// influence the tiebreak.
pub fn build_points(scheme: Scheme, raw_score: i16, min_begin: u16, text: &[u8]) -> u64 {
    let by_score = (u16::MAX as i32 - raw_score.max(0) as i32).clamp(0, u16::MAX as i32) as u16;
    let by_length = text.len().min(u16::MAX as usize) as u16;

    let (by_pathname, by_length) = match scheme {
        Scheme::Default => (0u16, by_length),
        Scheme::Path => {
            let distance = match last_path_separator_before(text, min_begin) {
                Some(sep) => (min_begin as usize).saturating_sub(sep + 1),
                None => min_begin as usize,
            };
            (distance.min(u16::MAX as usize) as u16, by_length)
        }
        Scheme::History => (0u16, 0u16),
    };

    ((by_score as u64) << 48) | ((by_pathname as u64) << 32) | ((by_length as u64) << 16)
}

impl MatchedItem {
    pub fn new(item: Item, raw_score: i16, min_begin: u16, scheme: Scheme, text: &[u8]) -> Self {
        let points = build_points(scheme, raw_score, min_begin, text);
        Self {
            item,
            raw_score,
            min_begin,
            points,
        }
    }

    /// The empty-query projection of a raw [`Item`]: score 0, no match begin,
    /// points synthesized from length alone (no text read required).
    fn identity(item: Item) -> Self {
        let by_length = item.length.min(u16::MAX as u32) as u16;
        let points = ((u16::MAX as u64) << 48) | ((by_length as u64) << 16);
        Self {
            item,
            raw_score: 0,
            min_begin: 0,
            points,
        }
    }
}

fn sort_key(m: &MatchedItem) -> (u64, u32) {
    (m.points, m.item.index)
}

/// A materialized, ranked view over one query's results.
///
/// `ChunkBacked` holds results still grouped per chunk (each chunk's slice
/// already sorted) and merges them lazily on first read. `PartitionBacked`
/// holds an already-flat result set, e.g. from [`crate::engine::match_items`]
/// on the previous query's result set during incremental filtering.
pub enum ResultMerger {
    /// The empty-query fast path: projects the live snapshot directly by
    /// insertion-order index. No matching, no sorting, no per-item
    /// allocation beyond the returned [`MatchedItem`] itself.
    Identity {
        snapshot: Snapshot,
    },
    ChunkBacked {
        chunks: Vec<Vec<MatchedItem>>,
        merged: RefCell<Option<Vec<MatchedItem>>>,
    },
    PartitionBacked {
        items: Vec<MatchedItem>,
    },
}

impl ResultMerger {
    /// Build the distinguished empty-query merger directly from a snapshot,
    /// bypassing the matcher and the ranked merge entirely.
    pub fn identity(snapshot: Snapshot) -> Self {
        Self::Identity { snapshot }
    }

    pub fn from_chunks(mut chunks: Vec<Vec<MatchedItem>>) -> Self {
        for chunk in &mut chunks {
            chunk.sort_by_key(sort_key);
        }
        Self::ChunkBacked {
            chunks,
            merged: RefCell::new(None),
        }
    }

    pub fn from_items(mut items: Vec<MatchedItem>) -> Self {
        items.sort_by_key(sort_key);
        Self::PartitionBacked { items }
    }

    pub fn empty() -> Self {
        Self::PartitionBacked { items: Vec::new() }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Identity { snapshot } => snapshot.count() as usize,
            Self::ChunkBacked { chunks, .. } => chunks.iter().map(Vec::len).sum(),
            Self::PartitionBacked { items } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn ensure_merged(&self) {
        if let Self::ChunkBacked { chunks, merged } = self {
            let mut guard = merged.borrow_mut();
            if guard.is_none() {
                *guard = Some(k_way_merge(chunks));
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<MatchedItem> {
        match self {
            Self::Identity { snapshot } => {
                snapshot.get(index as u32).map(MatchedItem::identity)
            }
            Self::ChunkBacked { merged, .. } => {
                self.ensure_merged();
                merged.borrow().as_ref().and_then(|v| v.get(index).copied())
            }
            Self::PartitionBacked { items } => items.get(index).copied(),
        }
    }

    /// `[start, end)` in ranked order, clamped to the available count.
    pub fn slice(&self, start: usize, end: usize) -> Vec<MatchedItem> {
        match self {
            Self::Identity { snapshot } => {
                let total = snapshot.count() as usize;
                let end = end.min(total);
                let start = start.min(end);
                (start..end)
                    .filter_map(|i| snapshot.get(i as u32).map(MatchedItem::identity))
                    .collect()
            }
            Self::ChunkBacked { merged, .. } => {
                self.ensure_merged();
                let guard = merged.borrow();
                let v = guard.as_ref().expect("merged on read path");
                let end = end.min(v.len());
                let start = start.min(end);
                v[start..end].to_vec()
            }
            Self::PartitionBacked { items } => {
                let end = end.min(items.len());
                let start = start.min(end);
                items[start..end].to_vec()
            }
        }
    }

    pub fn all_items(&self) -> Vec<MatchedItem> {
        self.slice(0, self.count())
    }

    /// Resolve a set of ranked-position indices (as tracked by the UI's
    /// multi-select state) to their `MatchedItem`s, at exit time.
    pub fn selected_items(&self, indices: &[usize]) -> Vec<MatchedItem> {
        indices.iter().filter_map(|&i| self.get(i)).collect()
    }
}

fn k_way_merge(chunks: &[Vec<MatchedItem>]) -> Vec<MatchedItem> {
    let total: usize = chunks.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    let mut heap: BinaryHeap<Reverse<(u64, u32, usize, usize)>> = BinaryHeap::new();

    for (chunk_idx, chunk) in chunks.iter().enumerate() {
        if let Some(first) = chunk.first() {
            heap.push(Reverse((first.points, first.item.index, chunk_idx, 0)));
        }
    }

    while let Some(Reverse((_, _, chunk_idx, item_idx))) = heap.pop() {
        out.push(chunks[chunk_idx][item_idx]);
        if let Some(next) = chunks[chunk_idx].get(item_idx + 1) {
            heap.push(Reverse((next.points, next.item.index, chunk_idx, item_idx + 1)));
        }
    }

    out
}
