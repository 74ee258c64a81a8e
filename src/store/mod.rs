//! Chunked item index over a [`TextBuffer`](crate::text_buffer::TextBuffer)
//!
//! ## store/ Invariants
//!
//! - `Item.index` equals insertion order, 0-based and contiguous.
//! - Every sealed [`Chunk`] holds exactly [`CHUNK_CAPACITY`] items and is never
//!   mutated again after sealing.
//! - Only the tail chunk may grow; a [`Snapshot`] captures the sealed chunks by
//!   shared reference and the tail by value, so further writer activity after
//!   a snapshot is taken never becomes visible through that snapshot.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Items per chunk; the unit of parallel work and per-chunk caching.
pub const CHUNK_CAPACITY: usize = 100;

/// A single candidate line: its insertion order plus its window into the
/// backing [`TextBuffer`](crate::text_buffer::TextBuffer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Item {
    pub index: u32,
    pub offset: u32,
    pub length: u32,
}

/// A group of up to [`CHUNK_CAPACITY`] items. Sealed once full.
#[derive(Debug, Clone)]
pub struct Chunk {
    items: Vec<Item>,
}

impl Chunk {
    fn empty() -> Self {
        Self {
            items: Vec::with_capacity(CHUNK_CAPACITY),
        }
    }

    fn push(&mut self, item: Item) {
        debug_assert!(self.items.len() < CHUNK_CAPACITY);
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == CHUNK_CAPACITY
    }

    pub fn get(&self, i: usize) -> Option<Item> {
        self.items.get(i).copied()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }
}

/// Append-only writer half plus shared reader half of the item index.
pub struct ChunkStore {
    sealed: Mutex<Arc<Vec<Arc<Chunk>>>>,
    tail: Mutex<Chunk>,
    total_count: AtomicU32,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self {
            sealed: Mutex::new(Arc::new(Vec::new())),
            tail: Mutex::new(Chunk::empty()),
            total_count: AtomicU32::new(0),
        }
    }

    /// Register a new item, returning its assigned index.
    pub fn register(&self, offset: u32, length: u32) -> u32 {
        let index = self.total_count.fetch_add(1, Ordering::SeqCst);
        let item = Item {
            index,
            offset,
            length,
        };

        let mut tail = self.tail.lock().unwrap_or_else(|e| e.into_inner());
        tail.push(item);

        if tail.is_full() {
            let sealed_chunk = Arc::new(std::mem::replace(&mut *tail, Chunk::empty()));
            let mut sealed = self.sealed.lock().unwrap_or_else(|e| e.into_inner());
            let mut next: Vec<Arc<Chunk>> = Vec::with_capacity(sealed.len() + 1);
            next.extend(sealed.iter().cloned());
            next.push(sealed_chunk);
            *sealed = Arc::new(next);
        }

        index
    }

    pub fn count(&self) -> u32 {
        self.total_count.load(Ordering::SeqCst)
    }

    /// Capture a point-in-time, safe-to-share view of the store.
    pub fn snapshot(&self) -> Snapshot {
        let sealed = Arc::clone(&self.sealed.lock().unwrap_or_else(|e| e.into_inner()));
        let tail = self.tail.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let total = (sealed.len() * CHUNK_CAPACITY) as u32 + tail.len() as u32;
        Snapshot {
            sealed,
            tail,
            total,
        }
    }

    /// Reclaim any unused tail capacity. Safe to call once the writer is done.
    pub fn seal(&self) {
        let mut tail = self.tail.lock().unwrap_or_else(|e| e.into_inner());
        tail.items.shrink_to_fit();
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time, cheaply cloneable view of a [`ChunkStore`].
///
/// Cloning a `Snapshot` is O(1): the sealed chunk list is reference-counted
/// and shared, and the (at most [`CHUNK_CAPACITY`]-item) tail is already a
/// plain value copied once at snapshot time.
#[derive(Clone)]
pub struct Snapshot {
    sealed: Arc<Vec<Arc<Chunk>>>,
    tail: Chunk,
    total: u32,
}

impl Snapshot {
    pub fn count(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of chunks visible in this snapshot, including a non-empty tail.
    pub fn chunk_count(&self) -> usize {
        self.sealed.len() + usize::from(!self.tail.is_empty())
    }

    pub fn chunk_at(&self, index: usize) -> Option<&Chunk> {
        if index < self.sealed.len() {
            Some(&self.sealed[index])
        } else if index == self.sealed.len() && !self.tail.is_empty() {
            Some(&self.tail)
        } else {
            None
        }
    }

    pub fn get(&self, index: u32) -> Option<Item> {
        let chunk_idx = index as usize / CHUNK_CAPACITY;
        let within = index as usize % CHUNK_CAPACITY;
        self.chunk_at(chunk_idx).and_then(|c| c.get(within))
    }

    pub fn for_each(&self, mut f: impl FnMut(Item)) {
        for chunk in self.sealed.iter() {
            for item in chunk.as_slice() {
                f(*item);
            }
        }
        for item in self.tail.as_slice() {
            f(*item);
        }
    }
}
