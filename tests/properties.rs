//! Property-based tests for the algorithmic invariants the matching/merge
//! pipeline is built on (see SPEC_FULL.md, "Testable properties"), run
//! against the public API the event loop itself drives.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use glint::cache::ChunkCache;
use glint::engine;
use glint::job_manager::CancellationSignal;
use glint::matcher::{match_positions, MatcherScratch};
use glint::merger::{MatchedItem, ResultMerger};
use glint::pattern::PreparedPattern;
use glint::scheme::Scheme;
use glint::store::{ChunkStore, Item, Snapshot};
use glint::text_buffer::TextBuffer;

fn build_store(lines: &[String]) -> (Arc<TextBuffer>, Arc<ChunkStore>) {
    let buffer = Arc::new(TextBuffer::new());
    let store = Arc::new(ChunkStore::new());
    for line in lines {
        let (offset, length) = buffer.append_raw(line.as_bytes());
        store.register(offset, length);
    }
    buffer.seal();
    store.seal();
    (buffer, store)
}

fn full_match(snapshot: &Snapshot, buffer: &TextBuffer, query: &str, scheme: Scheme) -> Vec<MatchedItem> {
    let Some(pattern) = PreparedPattern::prepare(query, false) else {
        return ResultMerger::identity(snapshot.clone()).all_items();
    };
    let cache = ChunkCache::new();
    let signal = CancellationSignal::new();
    let chunks = engine::match_chunks(snapshot, buffer, &pattern, scheme, &cache, &signal);
    ResultMerger::from_chunks(chunks).all_items()
}

fn corpus() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{0,10}", 0..40)
}

/// A base query and a strict, non-trivial extension of it.
fn extension_pair() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,3}", "[a-z]{1,3}").prop_map(|(base, extra)| (base.clone(), format!("{base}{extra}")))
}

proptest::proptest! {
    /// Invariant 1: enumerating a snapshot yields items whose `index` forms
    /// a contiguous `0..count` prefix, in that exact order.
    #[test]
    fn snapshot_enumeration_is_insertion_order(lines in corpus()) {
        let (_buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();
        let mut seen = Vec::new();
        snapshot.for_each(|item| seen.push(item.index));
        let expected: Vec<u32> = (0..lines.len() as u32).collect();
        prop_assert_eq!(seen, expected);
    }
}

proptest::proptest! {
    /// Invariant 2: a snapshot's contents never change, regardless of
    /// writer activity after it was taken.
    #[test]
    fn snapshot_is_stable_across_later_writes(initial in corpus(), more in corpus()) {
        let (buffer, store) = build_store(&initial);
        let snapshot = store.snapshot();
        let mut before = Vec::new();
        snapshot.for_each(|item| before.push(item));

        for line in &more {
            let (offset, length) = buffer.append_raw(line.as_bytes());
            store.register(offset, length);
        }

        let mut after = Vec::new();
        snapshot.for_each(|item| after.push(item));
        prop_assert_eq!(before, after);
        prop_assert_eq!(snapshot.count(), initial.len() as u32);
    }
}

proptest::proptest! {
    /// Invariant 3: two independent `match_chunks` runs over the same
    /// inputs produce identical ranked results.
    #[test]
    fn matching_is_deterministic_across_runs(lines in corpus(), query in "[a-z]{1,4}") {
        let (buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();
        let first = full_match(&snapshot, &buffer, &query, Scheme::Default);
        let second = full_match(&snapshot, &buffer, &query, Scheme::Default);
        prop_assert_eq!(first, second);
    }
}

proptest::proptest! {
    /// Invariant 4: the `(points, index)` comparator is a strict total
    /// order over a materialized result set.
    #[test]
    fn rank_order_is_strictly_increasing(lines in corpus(), query in "[a-z]{1,4}") {
        let (buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();
        let results = full_match(&snapshot, &buffer, &query, Scheme::Default);
        prop_assume!(results.len() >= 2);
        for pair in results.windows(2) {
            let a = (pair[0].points, pair[0].item.index);
            let b = (pair[1].points, pair[1].item.index);
            prop_assert!(a < b, "rank order not strictly increasing: {:?} >= {:?}", a, b);
        }
    }
}

proptest::proptest! {
    /// Invariant 5: if Q' strictly extends Q, everything matching Q' also
    /// matches Q (AND-token narrowing can only shrink the result set).
    #[test]
    fn incremental_extension_narrows_the_result_set(lines in corpus(), pair in extension_pair()) {
        let (base, extended) = pair;
        let (buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();

        let base_indices: HashSet<u32> = full_match(&snapshot, &buffer, &base, Scheme::Default)
            .iter()
            .map(|m| m.item.index)
            .collect();
        let extended_indices: HashSet<u32> = full_match(&snapshot, &buffer, &extended, Scheme::Default)
            .iter()
            .map(|m| m.item.index)
            .collect();

        prop_assert!(extended_indices.is_subset(&base_indices));
    }
}

proptest::proptest! {
    /// Invariant 6: permuting a multi-token query's tokens does not change
    /// which items match, their scores, or their (sorted, deduped) match
    /// positions.
    #[test]
    fn multi_token_order_does_not_affect_the_result(
        lines in corpus(),
        tok_a in "[a-z]{1,4}",
        tok_b in "[a-z]{1,4}",
    ) {
        prop_assume!(tok_a != tok_b);
        let (buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();

        let forward = format!("{tok_a} {tok_b}");
        let backward = format!("{tok_b} {tok_a}");

        let results_forward = full_match(&snapshot, &buffer, &forward, Scheme::Default);
        let results_backward = full_match(&snapshot, &buffer, &backward, Scheme::Default);

        let indices_forward: HashSet<u32> = results_forward.iter().map(|m| m.item.index).collect();
        let indices_backward: HashSet<u32> = results_backward.iter().map(|m| m.item.index).collect();
        prop_assert_eq!(indices_forward, indices_backward);

        let pattern_forward = PreparedPattern::prepare(&forward, false).unwrap();
        let pattern_backward = PreparedPattern::prepare(&backward, false).unwrap();
        let mut scratch = MatcherScratch::new();

        for matched in &results_forward {
            let counterpart = results_backward
                .iter()
                .find(|m| m.item.index == matched.item.index)
                .expect("same index set means a counterpart exists");
            prop_assert_eq!(matched.raw_score, counterpart.raw_score);

            let text = buffer.string(matched.item.offset, matched.item.length);
            let positions_forward = match_positions(&pattern_forward, text.as_bytes(), &mut scratch).map(|r| r.positions);
            let positions_backward = match_positions(&pattern_backward, text.as_bytes(), &mut scratch).map(|r| r.positions);
            prop_assert_eq!(positions_forward, positions_backward);
        }
    }
}

proptest::proptest! {
    /// Invariant 7: the empty query matches every item at score 0, in
    /// insertion order.
    #[test]
    fn empty_query_matches_everything_at_score_zero_in_insertion_order(lines in corpus()) {
        let (_buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();
        let results = ResultMerger::identity(snapshot).all_items();
        prop_assert_eq!(results.len(), lines.len());
        for (i, matched) in results.iter().enumerate() {
            prop_assert_eq!(matched.item.index, i as u32);
            prop_assert_eq!(matched.raw_score, 0);
        }
    }
}

proptest::proptest! {
    /// Invariant 8: regardless of the order selections were toggled in,
    /// the final accepted output is ascending by `item.index` (mirrors
    /// `App::finish`'s `indices.sort_unstable()` step).
    #[test]
    fn selection_output_is_ascending_by_index(
        lines in corpus(),
        picks in proptest::collection::vec(any::<proptest::sample::Index>(), 0..10),
    ) {
        prop_assume!(!lines.is_empty());
        let (_buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();

        let mut indices: Vec<u32> = picks.iter().map(|idx| idx.index(lines.len()) as u32).collect();
        indices.sort_unstable();
        indices.dedup();

        let items: Vec<Item> = indices.iter().filter_map(|&i| snapshot.get(i)).collect();
        let resolved: Vec<u32> = items.iter().map(|i| i.index).collect();
        prop_assert_eq!(&resolved, &indices);
        for window in resolved.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
    }
}

proptest::proptest! {
    /// Invariant 9: a `ChunkCache` exact hit reproduces the from-scratch
    /// result, and a prefix-narrowed `search` hit reproduces the same
    /// result a full rescan with the extended query would.
    #[test]
    fn cache_hits_match_a_from_scratch_rescan(lines in corpus(), pair in extension_pair()) {
        let (base, extended) = pair;
        let (buffer, store) = build_store(&lines);
        let snapshot = store.snapshot();
        let signal = CancellationSignal::new();

        // Both strings come from a non-empty regex strategy, so preparation
        // always succeeds; the empty-query fast path is covered separately.
        let base_pattern = PreparedPattern::prepare(&base, false).unwrap();
        let extended_pattern = PreparedPattern::prepare(&extended, false).unwrap();

        let primed_cache = ChunkCache::new();
        let base_chunks = engine::match_chunks(&snapshot, &buffer, &base_pattern, Scheme::Default, &primed_cache, &signal);
        // Exact hit: re-running the same query against the now-primed cache
        // must reproduce the same per-chunk results.
        let base_chunks_again = engine::match_chunks(&snapshot, &buffer, &base_pattern, Scheme::Default, &primed_cache, &signal);
        prop_assert_eq!(base_chunks, base_chunks_again);

        // Narrowed hit: matching the extension against the primed cache
        // must equal an independent from-scratch rescan with a fresh cache.
        let narrowed_chunks = engine::match_chunks(&snapshot, &buffer, &extended_pattern, Scheme::Default, &primed_cache, &signal);
        let ground_truth_chunks = engine::match_chunks(&snapshot, &buffer, &extended_pattern, Scheme::Default, &ChunkCache::new(), &signal);
        let narrowed = ResultMerger::from_chunks(narrowed_chunks).all_items();
        let ground_truth = ResultMerger::from_chunks(ground_truth_chunks).all_items();
        prop_assert_eq!(narrowed, ground_truth);
    }
}

proptest::proptest! {
    /// Invariant 10: `ResultMerger::count` is available as the sum of
    /// per-partition counts without materializing the merge.
    #[test]
    fn chunk_backed_count_is_sum_of_partition_lengths(sizes in proptest::collection::vec(0..20usize, 0..8)) {
        let mut next_index = 0u32;
        let chunks: Vec<Vec<MatchedItem>> = sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        let item = Item {
                            index: next_index,
                            offset: 0,
                            length: 1,
                        };
                        next_index += 1;
                        MatchedItem::new(item, 0, 0, Scheme::Default, b"x")
                    })
                    .collect()
            })
            .collect();
        let expected: usize = sizes.iter().sum();
        let merger = ResultMerger::from_chunks(chunks);
        prop_assert_eq!(merger.count(), expected);
    }
}

proptest::proptest! {
    /// Round-trip: the bytes appended to a `TextBuffer` for each item, read
    /// back by its `(offset, length)` window, reproduce that item exactly
    /// with no loss or duplication.
    #[test]
    fn text_buffer_round_trips_every_appended_line(lines in corpus()) {
        let buffer = TextBuffer::new();
        let windows: Vec<(u32, u32)> = lines.iter().map(|line| buffer.append_raw(line.as_bytes())).collect();
        for (line, (offset, length)) in lines.iter().zip(windows) {
            prop_assert_eq!(buffer.string(offset, length), line.clone());
        }
    }
}
