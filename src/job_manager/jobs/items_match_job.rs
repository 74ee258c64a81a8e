//! Background dispatch of an incremental match over a candidate list drawn
//! from a previous query's result set.

use std::any::Any;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::engine;
use crate::job_manager::{CancellationSignal, Job, JobMessage, JobPayload};
use crate::merger::MatchedItem;
use crate::pattern::PreparedPattern;
use crate::scheme::Scheme;
use crate::store::Item;
use crate::text_buffer::TextBuffer;

/// Result payload delivered via [`JobMessage::Custom`]: a single flat,
/// already-ranked result set, ready for [`crate::merger::ResultMerger::from_items`].
///
/// Carries the query it was computed against, for the same reason
/// [`crate::job_manager::jobs::match_job::MatchJobResult`] does.
#[derive(Debug)]
pub struct ItemsMatchJobResult {
    pub query: String,
    pub items: Vec<MatchedItem>,
}

impl JobPayload for ItemsMatchJobResult {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Matches `query` against an explicit candidate list, rather than a whole
/// snapshot. Used on the incremental-filtering fast path.
#[derive(Debug)]
pub struct ItemsMatchJob {
    pub query: String,
    pub case_sensitive: bool,
    pub scheme: Scheme,
    pub candidates: Vec<Item>,
    pub buffer: Arc<TextBuffer>,
}

impl Job for ItemsMatchJob {
    fn run(self: Box<Self>, id: usize, sender: Sender<JobMessage>, signal: CancellationSignal) {
        let Some(pattern) = PreparedPattern::prepare(&self.query, self.case_sensitive) else {
            let _ = sender.send(JobMessage::Finished(id, true));
            return;
        };

        let matches = engine::match_items(&self.candidates, &self.buffer, &pattern, &signal);
        if signal.is_cancelled() {
            let _ = sender.send(JobMessage::Cancelled(id));
            return;
        }

        let scheme = self.scheme;
        let items: Vec<MatchedItem> = self.buffer.with_bytes(|bytes| {
            matches
                .iter()
                .map(|engine_match| {
                    let start = engine_match.item.offset as usize;
                    let end = start
                        .saturating_add(engine_match.item.length as usize)
                        .min(bytes.len());
                    MatchedItem::new(
                        engine_match.item,
                        engine_match.rank.score,
                        engine_match.rank.min_begin,
                        scheme,
                        &bytes[start..end],
                    )
                })
                .collect()
        });

        let payload = ItemsMatchJobResult {
            query: self.query.clone(),
            items,
        };
        let _ = sender.send(JobMessage::Custom(id, Box::new(payload)));
        let _ = sender.send(JobMessage::Finished(id, true));
    }

    fn is_silent(&self) -> bool {
        true
    }
}
