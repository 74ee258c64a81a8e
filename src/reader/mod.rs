//! stdin producer thread: feeds lines into a [`TextBuffer`]/[`ChunkStore`] pair
//!
//! ## reader/ Invariants
//!
//! - Lines are LF-delimited; a trailing CR immediately before the LF is
//!   stripped (CRLF input is accepted transparently).
//! - A line containing only spaces/tabs is dropped, never registered as an item.
//! - A registered item's length is capped at [`MAX_ITEM_LENGTH`] so matcher and
//!   merger byte positions, packed into `u16`, never overflow; the full line is
//!   still appended to the buffer untruncated for display and preview.
//! - Exactly one [`ReaderEvent::Done`] is sent, after the buffer and store are
//!   sealed, and no further events follow it.

use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::FinderError;
use crate::store::ChunkStore;
use crate::text_buffer::TextBuffer;

/// Cap on a single candidate's registered length.
pub const MAX_ITEM_LENGTH: u32 = u16::MAX as u32;

/// Default interval between growth notifications, independent of line volume.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Events the reader thread reports back to the controller.
#[derive(Debug)]
pub enum ReaderEvent {
    /// New items were registered since the previous tick (or start of input).
    Tick,
    /// Input exhausted; buffer and store are sealed and will not grow further.
    Done,
    Error(FinderError),
}

pub struct ReaderHandle {
    pub events: Receiver<ReaderEvent>,
    pub join: JoinHandle<()>,
}

/// Spawn the producer thread reading `source` into `buffer`/`store`.
pub fn spawn<R: Read + Send + 'static>(
    source: R,
    buffer: Arc<TextBuffer>,
    store: Arc<ChunkStore>,
) -> ReaderHandle {
    spawn_with_tick(source, buffer, store, DEFAULT_TICK_INTERVAL)
}

pub fn spawn_with_tick<R: Read + Send + 'static>(
    source: R,
    buffer: Arc<TextBuffer>,
    store: Arc<ChunkStore>,
    tick_interval: Duration,
) -> ReaderHandle {
    let (sender, receiver) = mpsc::channel();
    let join = thread::spawn(move || run(source, &buffer, &store, &sender, tick_interval));
    ReaderHandle {
        events: receiver,
        join,
    }
}

fn run<R: Read>(
    source: R,
    buffer: &TextBuffer,
    store: &ChunkStore,
    sender: &Sender<ReaderEvent>,
    tick_interval: Duration,
) {
    let mut reader = BufReader::new(source);
    let mut raw = Vec::new();
    let mut last_tick = Instant::now();
    let mut dirty = false;

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {
                if let Some(line) = normalize_line(&raw) {
                    let (offset, length) = buffer.append_raw(line);
                    store.register(offset, length.min(MAX_ITEM_LENGTH));
                    dirty = true;
                }
            }
            Err(err) => {
                log::error!("stdin read failed: {err}");
                let _ = sender.send(ReaderEvent::Error(FinderError::from(err)));
                break;
            }
        }

        if dirty && last_tick.elapsed() >= tick_interval {
            let _ = sender.send(ReaderEvent::Tick);
            last_tick = Instant::now();
            dirty = false;
        }
    }

    if dirty {
        let _ = sender.send(ReaderEvent::Tick);
    }
    buffer.seal();
    store.seal();
    let _ = sender.send(ReaderEvent::Done);
}

/// Strip a trailing LF and a CR immediately before it, then reject
/// whitespace-only lines. `None` means the line should be dropped.
fn normalize_line(raw: &[u8]) -> Option<&[u8]> {
    let mut line = raw;
    if line.last() == Some(&b'\n') {
        line = &line[..line.len() - 1];
    }
    if line.last() == Some(&b'\r') {
        line = &line[..line.len() - 1];
    }
    if line.iter().all(|&b| b == b' ' || b == b'\t') {
        None
    } else {
        Some(line)
    }
}
