//! Chunk-parallel dispatch of the matching kernel over a snapshot or an
//! arbitrary item list.
//!
//! ## engine/ Invariants
//!
//! - A call never mutates the [`Snapshot`] or [`PreparedPattern`] it is given;
//!   both are borrowed read-only for the call's duration.
//! - Each worker owns one [`MatcherScratch`], allocated once per call and
//!   never shared across threads.
//! - Output order is unspecified; callers that need rank order sort the
//!   result themselves (see [`crate::merger`]).

use std::thread;

use crate::cache::ChunkCache;
use crate::job_manager::CancellationSignal;
use crate::matcher::{match_rank, MatcherScratch, RankMatch};
use crate::merger::MatchedItem;
use crate::pattern::PreparedPattern;
use crate::scheme::Scheme;
use crate::store::{Item, Snapshot};
use crate::text_buffer::TextBuffer;

/// One candidate's rank result, paired with the item it came from.
#[derive(Debug, Clone, Copy)]
pub struct EngineMatch {
    pub item: Item,
    pub rank: RankMatch,
}

fn worker_count(work: usize) -> usize {
    let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    available.min(work.max(1))
}

fn match_against(
    items: &[Item],
    bytes: &[u8],
    pattern: &PreparedPattern,
    scheme: Scheme,
    scratch: &mut MatcherScratch,
) -> Vec<MatchedItem> {
    items
        .iter()
        .filter_map(|item| {
            let start = item.offset as usize;
            let end = start.saturating_add(item.length as usize).min(bytes.len());
            match_rank(pattern, &bytes[start..end], scratch).map(|rank| {
                MatchedItem::new(*item, rank.score, rank.min_begin, scheme, &bytes[start..end])
            })
        })
        .collect()
}

/// Match every item currently visible in `snapshot` against `pattern`,
/// producing one already-ranked partition per chunk.
///
/// Work is partitioned by chunk index, round-robin across workers, so a
/// worker's slice of chunks is contiguous in none but striped across all;
/// this keeps workers busy even when later chunks are cheaper to reject.
/// Each chunk first consults `cache`: an exact `(chunk, query)` hit skips
/// matching entirely, and a hit on a strict prefix narrows the rescan to
/// that prior, already-selective candidate set.
pub fn match_chunks(
    snapshot: &Snapshot,
    buffer: &TextBuffer,
    pattern: &PreparedPattern,
    scheme: Scheme,
    cache: &ChunkCache,
    signal: &CancellationSignal,
) -> Vec<Vec<MatchedItem>> {
    let chunk_count = snapshot.chunk_count();
    if chunk_count == 0 {
        return Vec::new();
    }
    let workers = worker_count(chunk_count);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || {
                    let mut scratch = MatcherScratch::new();
                    let mut local: Vec<Vec<MatchedItem>> = Vec::new();
                    buffer.with_bytes(|bytes| {
                        let mut chunk_idx = worker;
                        while chunk_idx < chunk_count {
                            if signal.is_cancelled() {
                                return;
                            }
                            let Some(chunk) = snapshot.chunk_at(chunk_idx) else {
                                chunk_idx += workers;
                                continue;
                            };
                            let count = chunk.len() as u32;

                            if let Some(cached) = cache.lookup(chunk_idx, count, pattern.original())
                            {
                                local.push(cached);
                                chunk_idx += workers;
                                continue;
                            }

                            let narrowed = cache.search(chunk_idx, count, pattern.original());
                            let results = match &narrowed {
                                Some(prior) => {
                                    let candidates: Vec<Item> =
                                        prior.iter().map(|m| m.item).collect();
                                    match_against(&candidates, bytes, pattern, scheme, &mut scratch)
                                }
                                None => {
                                    match_against(chunk.as_slice(), bytes, pattern, scheme, &mut scratch)
                                }
                            };

                            cache.store(chunk_idx, count, pattern.original(), results.clone());
                            local.push(results);
                            chunk_idx += workers;
                        }
                    });
                    local
                })
            })
            .collect();

        let mut out = Vec::new();
        for handle in handles {
            if let Ok(mut local) = handle.join() {
                out.append(&mut local);
            }
        }
        out
    })
}

/// Match an explicit list of items against `pattern`.
///
/// Used by the incremental-filtering fast path, where the previous result
/// set (rather than the whole snapshot) is the search space.
pub fn match_items(
    items: &[Item],
    buffer: &TextBuffer,
    pattern: &PreparedPattern,
    signal: &CancellationSignal,
) -> Vec<EngineMatch> {
    if items.is_empty() {
        return Vec::new();
    }
    let workers = worker_count(items.len());
    let chunk_len = items.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_len.max(1))
            .map(|slice| {
                scope.spawn(move || {
                    let mut scratch = MatcherScratch::new();
                    let mut local = Vec::new();
                    buffer.with_bytes(|bytes| {
                        for item in slice {
                            if signal.is_cancelled() {
                                return;
                            }
                            let start = item.offset as usize;
                            let end = start.saturating_add(item.length as usize).min(bytes.len());
                            if let Some(rank) = match_rank(pattern, &bytes[start..end], &mut scratch) {
                                local.push(EngineMatch { item: *item, rank });
                            }
                        }
                    });
                    local
                })
            })
            .collect();

        let mut out = Vec::new();
        for handle in handles {
            if let Ok(mut local) = handle.join() {
                out.append(&mut local);
            }
        }
        out
    })
}
