//! Append-only contiguous byte store
//!
//! ## text_buffer/ Invariants
//!
//! - Exactly one writer appends; any number of readers may read concurrently.
//! - Once an `(offset, length)` window has been handed back from `append_raw`,
//!   the bytes it covers never move or change for the life of the buffer.
//! - `seal` only ever shrinks excess capacity; it never changes observable contents.

use std::sync::RwLock;

/// A single contiguous append-only byte store.
///
/// Backed by a growable `Vec<u8>` behind a reader/writer lock, per the
/// growable-array backing-store option: simpler and more portable than a
/// memory-mapped region, and sufficient at the scale this tool targets.
pub struct TextBuffer {
    inner: RwLock<Vec<u8>>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append raw bytes, returning the `(offset, length)` window they now occupy.
    pub fn append_raw(&self, src: &[u8]) -> (u32, u32) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let offset = guard.len() as u32;
        guard.extend_from_slice(src);
        (offset, src.len() as u32)
    }

    /// Run `body` with a shared view of the whole buffer.
    pub fn with_bytes<R>(&self, body: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        body(&guard)
    }

    /// Decode the given window as a (possibly lossy) UTF-8 string. Cold path;
    /// used only for rendering and for stdout output, never for matching.
    pub fn string(&self, offset: u32, length: u32) -> String {
        self.with_bytes(|buf| {
            let start = offset as usize;
            let end = start.saturating_add(length as usize).min(buf.len());
            let start = start.min(end);
            String::from_utf8_lossy(&buf[start..end]).into_owned()
        })
    }

    /// Total number of bytes currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reclaim any over-allocated growth headroom. Safe to call repeatedly;
    /// a no-op once capacity already equals length.
    pub fn seal(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.shrink_to_fit();
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
