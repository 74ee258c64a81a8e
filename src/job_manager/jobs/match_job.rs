//! Background dispatch of a full-snapshot match over all visible chunks.

use std::any::Any;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::cache::ChunkCache;
use crate::engine;
use crate::job_manager::{CancellationSignal, Job, JobMessage, JobPayload};
use crate::merger::MatchedItem;
use crate::pattern::PreparedPattern;
use crate::scheme::Scheme;
use crate::store::Snapshot;
use crate::text_buffer::TextBuffer;

/// Result payload delivered via [`JobMessage::Custom`]: one ranked result set
/// per chunk, ready for [`crate::merger::ResultMerger::from_chunks`].
///
/// Carries the query it was computed against so the controller can apply it
/// under that query rather than whatever query is current by the time it lands.
#[derive(Debug)]
pub struct MatchJobResult {
    pub query: String,
    pub chunks: Vec<Vec<MatchedItem>>,
}

impl JobPayload for MatchJobResult {
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

/// Matches `query` against every item visible in `snapshot`.
#[derive(Debug)]
pub struct MatchJob {
    pub query: String,
    pub case_sensitive: bool,
    pub scheme: Scheme,
    pub snapshot: Snapshot,
    pub buffer: Arc<TextBuffer>,
    pub cache: Arc<ChunkCache>,
}

impl Job for MatchJob {
    fn run(self: Box<Self>, id: usize, sender: Sender<JobMessage>, signal: CancellationSignal) {
        let Some(pattern) = PreparedPattern::prepare(&self.query, self.case_sensitive) else {
            let _ = sender.send(JobMessage::Finished(id, true));
            return;
        };

        let chunks = engine::match_chunks(
            &self.snapshot,
            &self.buffer,
            &pattern,
            self.scheme,
            &self.cache,
            &signal,
        );
        if signal.is_cancelled() {
            let _ = sender.send(JobMessage::Cancelled(id));
            return;
        }

        let payload = MatchJobResult {
            query: self.query.clone(),
            chunks,
        };
        let _ = sender.send(JobMessage::Custom(id, Box::new(payload)));
        let _ = sender.send(JobMessage::Finished(id, true));
    }

    fn is_silent(&self) -> bool {
        true
    }
}
