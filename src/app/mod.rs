//! Event-loop controller: wires the reader, matching engine, caches, and
//! renderer together into one interactive session.
//!
//! ## app/ Invariants
//!
//! - `UIState.merger_query` is only ever mutated by [`App::apply_merger`],
//!   when a merger is actually installed as `UIState.merger` — never
//!   optimistically when a query is dispatched. Incremental-filtering
//!   decisions gate on this field, so a query whose match job is still in
//!   flight can never be mistaken for one whose results have landed.
//! - A background match result is applied only if it is still the job this
//!   controller is waiting on and the controller is not already exiting;
//!   stale or post-shutdown completions are discarded.
//! - Terminal state is restored (`deinit`) before `run` returns under every
//!   exit path, including cancellation and interruption.

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::merger_cache::MergerCache;
use crate::cache::ChunkCache;
use crate::error::{ErrorKind, FinderError};
use crate::job_manager::jobs::items_match_job::{ItemsMatchJob, ItemsMatchJobResult};
use crate::job_manager::jobs::match_job::{MatchJob, MatchJobResult};
use crate::job_manager::jobs::preview_job::{PreviewJob, PreviewJobResult};
use crate::job_manager::{JobManager, JobMessage};
use crate::key::Key;
use crate::matcher::{match_positions, MatcherScratch};
use crate::merger::ResultMerger;
use crate::pattern::PreparedPattern;
use crate::preview::PreviewOutcome;
use crate::reader::{self, ReaderEvent, ReaderHandle};
use crate::render::{Frame, RenderRow, Renderer, TerminalRenderer};
use crate::scheme::Scheme;
use crate::store::{ChunkStore, Item};
use crate::term::{ColorTerminal, TerminalBackend};
use crate::text_buffer::TextBuffer;
use crate::ui::state::UIState;

/// Minimum gap between a keystroke and the query it produces being dispatched.
const DEBOUNCE: Duration = Duration::from_millis(50);
/// Minimum gap between successive growth-triggered re-matches.
const TICK_REMATCH_MIN_INTERVAL: Duration = Duration::from_millis(100);
/// Results above this count are not worth caching in the single-entry [`MergerCache`].
const MERGER_CACHE_LIMIT: usize = 100_000;
/// How often the event loop wakes up on its own to drain channels even with no key events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Session-wide configuration, derived from CLI arguments.
pub struct Config {
    pub multi: bool,
    pub case_sensitive: bool,
    pub height: Option<u16>,
    pub preview_template: Option<String>,
    pub scheme: Scheme,
}

/// What the controller produced when `run` returned.
pub enum Outcome {
    /// The user accepted a selection (possibly empty, if nothing matched).
    Accepted(Vec<String>),
    /// The user backed out with Escape.
    Cancelled,
    /// The user interrupted with Ctrl-C.
    Interrupted,
}

fn term_err(e: String) -> FinderError {
    FinderError::new(ErrorKind::Terminal, "TERM_IO", e)
}

/// Whether `query` can be served by filtering `merger_query`'s result set
/// (the query the currently-held merger was actually computed against)
/// rather than rescanning the whole snapshot: it must be a strict,
/// non-trivial extension of `merger_query`.
fn can_use_incremental(merger_query: &str, query: &str) -> bool {
    !merger_query.is_empty() && query.len() > merger_query.len() && query.starts_with(merger_query)
}

/// Owns every piece of session state and drives the interactive loop.
pub struct App<T: TerminalBackend + ColorTerminal> {
    renderer: TerminalRenderer<T>,
    buffer: Arc<TextBuffer>,
    store: Arc<ChunkStore>,
    reader: ReaderHandle,
    jobs: JobManager,
    chunk_cache: Arc<ChunkCache>,
    merger_cache: MergerCache,
    state: UIState,
    config: Config,
    /// The job this controller is currently waiting on, whether it was
    /// dispatched on the incremental-filtering path, and the exact query
    /// string it was dispatched for.
    match_job: Option<(usize, bool, String)>,
    preview_job: Option<usize>,
    preview_text: String,
    debounce_deadline: Option<Instant>,
    last_rematch_at: Instant,
    last_seen_count: u32,
    is_exiting: bool,
    interrupted: bool,
}

impl<T: TerminalBackend + ColorTerminal> App<T> {
    /// Build a new session: initializes the terminal, spawns the stdin
    /// reader, and seeds the initial query (if any) for immediate dispatch.
    pub fn new<R: std::io::Read + Send + 'static>(
        mut backend: T,
        config: Config,
        stdin: R,
        initial_query: &str,
    ) -> Result<Self, FinderError> {
        backend.init().map_err(term_err)?;

        let buffer = Arc::new(TextBuffer::new());
        let store = Arc::new(ChunkStore::new());
        let reader = reader::spawn(stdin, Arc::clone(&buffer), Arc::clone(&store));

        let mut state = UIState::new();
        for ch in initial_query.chars() {
            state.insert_char(ch);
        }

        let mut app = Self {
            renderer: TerminalRenderer::new(backend),
            buffer,
            store,
            reader,
            jobs: JobManager::new(),
            chunk_cache: Arc::new(ChunkCache::new()),
            merger_cache: MergerCache::new(),
            state,
            config,
            match_job: None,
            preview_job: None,
            preview_text: String::new(),
            debounce_deadline: None,
            last_rematch_at: Instant::now(),
            last_seen_count: 0,
            is_exiting: false,
            interrupted: false,
        };

        app.dispatch_query();
        Ok(app)
    }

    /// Run the interactive loop to completion, returning the user's outcome.
    /// Restores terminal state before returning under every exit path.
    pub fn run(mut self) -> Result<Outcome, FinderError> {
        let result = self.event_loop();
        if let Err(ref err) = result {
            log::error!("event loop exited with a terminal error: {err}");
        }
        self.is_exiting = true;
        self.renderer.backend_mut().deinit();
        result.map(|()| self.finish())
    }

    fn event_loop(&mut self) -> Result<(), FinderError> {
        self.render()?;
        loop {
            self.drain_reader_events();
            self.drain_job_messages();
            if self.state.should_exit {
                return Ok(());
            }
            self.maybe_fire_debounce();

            if self.renderer.backend_mut().poll(POLL_INTERVAL).map_err(term_err)? {
                if let Some(key) = self.renderer.backend_mut().read_key().map_err(term_err)? {
                    self.handle_key(key);
                }
            }
            if self.state.should_exit {
                return Ok(());
            }
            self.render()?;
        }
    }

    fn drain_reader_events(&mut self) {
        while let Ok(event) = self.reader.events.try_recv() {
            match event {
                ReaderEvent::Tick => self.handle_growth_tick(),
                ReaderEvent::Done | ReaderEvent::Error(_) => {}
            }
        }
    }

    /// Item-set growth path. Re-matches the current query against the grown
    /// snapshot; applying its result naturally refreshes `merger_query` to
    /// the same query text once it lands, so no special-casing is needed
    /// here to protect the debounce path's incremental-filtering decision.
    fn handle_growth_tick(&mut self) {
        let count = self.store.count();
        if count <= self.last_seen_count || self.last_rematch_at.elapsed() < TICK_REMATCH_MIN_INTERVAL {
            return;
        }
        self.last_seen_count = count;
        self.last_rematch_at = Instant::now();

        log::debug!("growth tick: re-matching at {count} items");
        self.cancel_match_job();
        self.merger_cache.invalidate();
        self.chunk_cache.clear();

        if self.state.query.is_empty() {
            self.apply_merger(Rc::new(ResultMerger::identity(self.store.snapshot())), false, "");
        } else {
            let query = self.state.query.clone();
            let job_id = self.jobs.spawn(MatchJob {
                query: query.clone(),
                case_sensitive: self.config.case_sensitive,
                scheme: self.config.scheme,
                snapshot: self.store.snapshot(),
                buffer: Arc::clone(&self.buffer),
                cache: Arc::clone(&self.chunk_cache),
            });
            self.match_job = Some((job_id, false, query));
        }
    }

    fn drain_job_messages(&mut self) {
        while let Ok(msg) = self.jobs.receiver().try_recv() {
            self.jobs.update_job_state(&msg);
            match msg {
                JobMessage::Custom(id, payload) => self.handle_job_payload(id, payload),
                JobMessage::Finished(id, _) | JobMessage::Cancelled(id) => {
                    if matches!(&self.match_job, Some((job, _, _)) if *job == id) {
                        self.match_job = None;
                    }
                    if self.preview_job == Some(id) {
                        self.preview_job = None;
                    }
                }
                JobMessage::Started(..) | JobMessage::Progress(..) | JobMessage::Error(..) => {}
            }
        }
        self.jobs.cleanup_finished_jobs();
    }

    fn handle_job_payload(&mut self, id: usize, payload: Box<dyn crate::job_manager::JobPayload>) {
        if self.is_exiting {
            return;
        }
        let any = payload.into_any();

        let any = match any.downcast::<MatchJobResult>() {
            Ok(result) => {
                if matches!(&self.match_job, Some((job, _, _)) if *job == id) {
                    let (_, incremental, _) = self.match_job.take().unwrap();
                    log::debug!("applying full-scan match for {:?}", result.query);
                    let merger = Rc::new(ResultMerger::from_chunks(result.chunks));
                    self.apply_merger(merger, !incremental, &result.query);
                }
                return;
            }
            Err(any) => any,
        };

        let any = match any.downcast::<ItemsMatchJobResult>() {
            Ok(result) => {
                if matches!(&self.match_job, Some((job, _, _)) if *job == id) {
                    self.match_job = None;
                    log::debug!("applying incremental match for {:?}", result.query);
                    let merger = Rc::new(ResultMerger::from_items(result.items));
                    self.apply_merger(merger, false, &result.query);
                }
                return;
            }
            Err(any) => any,
        };

        if let Ok(result) = any.downcast::<PreviewJobResult>() {
            if self.preview_job == Some(id) {
                self.preview_text = describe_preview(&result.outcome);
                self.preview_job = None;
            }
        }
    }

    fn cancel_match_job(&mut self) {
        if let Some((id, _, query)) = self.match_job.take() {
            log::debug!("cancelling in-flight match for {query:?}");
            self.jobs.cancel_job(id);
        }
    }

    fn cancel_preview_job(&mut self) {
        if let Some(id) = self.preview_job.take() {
            self.jobs.cancel_job(id);
        }
    }

    /// Decides the matching strategy from `self.state.merger_query` — the
    /// query the *currently held* merger was actually computed against, not
    /// whatever query was most recently dispatched. That distinction matters
    /// when a dispatch races ahead of a still-in-flight job: `merger_query`
    /// only advances once `apply_merger` actually installs a new merger, so
    /// a query dispatched while an earlier one is still in flight can never
    /// be wrongly treated as a narrowing of results that have not landed yet.
    fn dispatch_query(&mut self) {
        let query = self.state.query.clone();
        self.cancel_match_job();

        if query.is_empty() {
            self.apply_merger(Rc::new(ResultMerger::identity(self.store.snapshot())), false, "");
            return;
        }

        let incremental = can_use_incremental(&self.state.merger_query, &query);
        log::debug!("dispatching query {query:?} (incremental={incremental})");

        if !incremental {
            if let Some(cached) = self.merger_cache.get(&query, self.store.count()) {
                self.apply_merger(cached, false, &query);
                return;
            }
        }

        let job_id = if incremental {
            let candidates: Vec<Item> = self.state.merger.all_items().into_iter().map(|m| m.item).collect();
            self.jobs.spawn(ItemsMatchJob {
                query: query.clone(),
                case_sensitive: self.config.case_sensitive,
                scheme: self.config.scheme,
                candidates,
                buffer: Arc::clone(&self.buffer),
            })
        } else {
            self.jobs.spawn(MatchJob {
                query: query.clone(),
                case_sensitive: self.config.case_sensitive,
                scheme: self.config.scheme,
                snapshot: self.store.snapshot(),
                buffer: Arc::clone(&self.buffer),
                cache: Arc::clone(&self.chunk_cache),
            })
        };
        self.match_job = Some((job_id, incremental, query));
    }

    /// Installs `merger` as the current result set for `query`, stamping
    /// `merger_query` so later incremental-filtering decisions are gated on
    /// the query these results actually reflect.
    fn apply_merger(&mut self, merger: Rc<ResultMerger>, cacheable: bool, query: &str) {
        if cacheable && !query.is_empty() && merger.count() <= MERGER_CACHE_LIMIT {
            self.merger_cache.store(query, self.store.count(), Rc::clone(&merger));
        }
        self.state.merger = merger;
        self.state.merger_query = query.to_string();
        let height = self.visible_height().unwrap_or(0);
        self.state.reconcile_after_rematch(height);
        self.queue_preview_refresh();
    }

    fn queue_query_update(&mut self) {
        self.debounce_deadline = Some(Instant::now() + DEBOUNCE);
    }

    fn maybe_fire_debounce(&mut self) {
        if let Some(deadline) = self.debounce_deadline {
            if Instant::now() >= deadline {
                self.debounce_deadline = None;
                self.dispatch_query();
            }
        }
    }

    fn queue_preview_refresh(&mut self) {
        let Some(template) = self.config.preview_template.clone() else {
            return;
        };
        self.cancel_preview_job();
        let Some(item) = self.state.current_item() else {
            self.preview_text.clear();
            return;
        };
        let candidate = self.buffer.string(item.item.offset, item.item.length);
        let id = self.jobs.spawn(PreviewJob { template, candidate });
        self.preview_job = Some(id);
    }

    fn visible_height(&self) -> Result<usize, FinderError> {
        let size = self.renderer.size()?;
        let available = size.rows.saturating_sub(1) as usize;
        Ok(match self.config.height {
            Some(h) => available.min(h as usize),
            None => available,
        })
    }

    fn handle_key(&mut self, key: Key) {
        if self.is_exiting {
            return;
        }
        match key {
            Key::Char(c) => {
                self.state.insert_char(c);
                self.queue_query_update();
            }
            Key::Backspace => {
                self.state.delete_before_cursor();
                self.queue_query_update();
            }
            Key::ArrowLeft => self.state.move_cursor(-1),
            Key::ArrowRight => self.state.move_cursor(1),
            Key::Home | Key::CtrlHome => self.state.move_cursor(isize::MIN / 2),
            Key::End | Key::CtrlEnd => self.state.move_cursor(isize::MAX / 2),
            Key::ArrowUp => {
                let height = self.visible_height().unwrap_or(0);
                self.state.move_selection(-1, height);
                self.queue_preview_refresh();
            }
            Key::ArrowDown => {
                let height = self.visible_height().unwrap_or(0);
                self.state.move_selection(1, height);
                self.queue_preview_refresh();
            }
            Key::PageUp => {
                let height = self.visible_height().unwrap_or(0);
                self.state.move_selection(-(height.max(1) as isize), height);
                self.queue_preview_refresh();
            }
            Key::PageDown => {
                let height = self.visible_height().unwrap_or(0);
                self.state.move_selection(height.max(1) as isize, height);
                self.queue_preview_refresh();
            }
            Key::Tab => {
                if self.config.multi {
                    self.state.toggle_selection_at_cursor();
                }
            }
            Key::Enter => self.accept(),
            Key::Escape => self.cancel(),
            Key::Ctrl(c) if c == b'c' || c == b'C' => self.interrupt(),
            Key::Resize(..) => {}
            Key::CtrlArrowUp
            | Key::CtrlArrowDown
            | Key::CtrlArrowLeft
            | Key::CtrlArrowRight
            | Key::Delete
            | Key::Ctrl(_) => {}
        }
    }

    fn accept(&mut self) {
        log::info!("accepting selection, {} match(es) visible", self.state.match_count());
        self.state.should_exit = true;
        self.state.exit_with_selection = true;
    }

    fn cancel(&mut self) {
        log::info!("cancelled without a selection");
        self.state.should_exit = true;
        self.state.exit_with_selection = false;
    }

    fn interrupt(&mut self) {
        log::warn!("interrupted by Ctrl-C");
        self.state.should_exit = true;
        self.state.exit_with_selection = false;
        self.interrupted = true;
    }

    fn render(&mut self) -> Result<(), FinderError> {
        let height = self.visible_height()?;
        let rows = self.state.visible_window(height);
        let highlighted_row = self.state.selected_index.saturating_sub(self.state.scroll_offset);

        let pattern = PreparedPattern::prepare(&self.state.query, self.config.case_sensitive);
        let mut scratch = MatcherScratch::new();
        let render_rows: Vec<RenderRow> = rows
            .into_iter()
            .map(|matched| {
                let text = self.buffer.string(matched.item.offset, matched.item.length);
                let positions = pattern
                    .as_ref()
                    .and_then(|p| match_positions(p, text.as_bytes(), &mut scratch))
                    .map(|r| r.positions)
                    .unwrap_or_default();
                RenderRow {
                    text,
                    positions,
                    multi_selected: self.state.selected_items.contains(&matched.item.index),
                }
            })
            .collect();

        let frame = Frame {
            query: &self.state.query,
            cursor_position: self.state.cursor_position,
            rows: render_rows,
            highlighted_row,
            match_count: self.state.match_count(),
            total_items: self.store.count(),
        };
        self.renderer.render(&frame)
    }

    fn finish(self) -> Outcome {
        if !self.state.exit_with_selection {
            return if self.interrupted {
                Outcome::Interrupted
            } else {
                Outcome::Cancelled
            };
        }

        let mut indices: Vec<u32> = if self.config.multi && !self.state.selected_items.is_empty() {
            self.state.selected_items.iter().copied().collect()
        } else if let Some(item) = self.state.current_item() {
            vec![item.item.index]
        } else {
            Vec::new()
        };
        indices.sort_unstable();

        let snapshot = self.store.snapshot();
        let lines = indices
            .into_iter()
            .filter_map(|idx| snapshot.get(idx))
            .map(|item| self.buffer.string(item.offset, item.length))
            .collect();
        Outcome::Accepted(lines)
    }
}

fn describe_preview(outcome: &PreviewOutcome) -> String {
    match outcome {
        PreviewOutcome::Output(text) => text.clone(),
        PreviewOutcome::TimedOut => "preview timed out".to_string(),
        PreviewOutcome::Failed(err) => format!("preview failed: {err}"),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
