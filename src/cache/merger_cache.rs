//! Single-entry whole-dataset merge cache, owned by the UI controller.

use std::rc::Rc;

use crate::merger::ResultMerger;

/// Caches the most recently materialized [`ResultMerger`] for one
/// `(query, item_count)` pair. Not thread-safe by design: it is only ever
/// touched from the controller's single event-loop thread.
pub struct MergerCache {
    entry: Option<(String, u32, Rc<ResultMerger>)>,
}

impl MergerCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    pub fn get(&self, query: &str, item_count: u32) -> Option<Rc<ResultMerger>> {
        self.entry.as_ref().and_then(|(q, count, merger)| {
            if q == query && *count == item_count {
                Some(Rc::clone(merger))
            } else {
                None
            }
        })
    }

    pub fn store(&mut self, query: &str, item_count: u32, merger: Rc<ResultMerger>) {
        self.entry = Some((query.to_string(), item_count, merger));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for MergerCache {
    fn default() -> Self {
        Self::new()
    }
}
