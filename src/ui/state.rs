//! UI-visible state: query, selection, and the current ranked result view.

use std::collections::HashSet;
use std::rc::Rc;

use crate::merger::{MatchedItem, ResultMerger};

/// Everything the renderer needs for one frame, plus the cursor/selection
/// bookkeeping the event loop mutates in response to input.
pub struct UIState {
    pub query: String,
    /// The query the currently-held `merger` was actually computed against.
    /// Set only when a merger is applied, never optimistically at dispatch
    /// time, so it always accurately reflects what `merger` contains.
    pub merger_query: String,
    pub cursor_position: usize,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub selected_items: HashSet<u32>,
    pub merger: Rc<ResultMerger>,
    pub total_items: u32,
    pub should_exit: bool,
    pub exit_with_selection: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            merger_query: String::new(),
            cursor_position: 0,
            selected_index: 0,
            scroll_offset: 0,
            selected_items: HashSet::new(),
            merger: Rc::new(ResultMerger::empty()),
            total_items: 0,
            should_exit: false,
            exit_with_selection: false,
        }
    }

    pub fn match_count(&self) -> usize {
        self.merger.count()
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte_index(self.cursor_position);
        self.query.insert(byte_idx, ch);
        self.cursor_position += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let end = self.char_to_byte_index(self.cursor_position);
        let start = self.char_to_byte_index(self.cursor_position - 1);
        self.query.replace_range(start..end, "");
        self.cursor_position -= 1;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.query.chars().count() as isize;
        let next = (self.cursor_position as isize + delta).clamp(0, len);
        self.cursor_position = next as usize;
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.query
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }

    /// Move the highlighted row, clamping to `[0, match_count)` and keeping it
    /// inside `[scroll_offset, scroll_offset + height)`.
    pub fn move_selection(&mut self, delta: isize, height: usize) {
        let count = self.match_count();
        if count == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
            return;
        }
        let next = (self.selected_index as isize + delta).clamp(0, count as isize - 1);
        self.selected_index = next as usize;

        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if height > 0 && self.selected_index >= self.scroll_offset + height {
            self.scroll_offset = self.selected_index + 1 - height;
        }
    }

    /// Clamp selection/scroll after the result set changes shape.
    pub fn reconcile_after_rematch(&mut self, height: usize) {
        let count = self.match_count();
        if count == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
            return;
        }
        if self.selected_index >= count {
            self.selected_index = count - 1;
        }
        if self.scroll_offset > self.selected_index {
            self.scroll_offset = self.selected_index;
        }
        if height > 0 && self.selected_index >= self.scroll_offset + height {
            self.scroll_offset = self.selected_index + 1 - height;
        }
    }

    pub fn toggle_selection_at_cursor(&mut self) {
        if let Some(item) = self.merger.get(self.selected_index) {
            if !self.selected_items.remove(&item.item.index) {
                self.selected_items.insert(item.item.index);
            }
        }
    }

    pub fn current_item(&self) -> Option<MatchedItem> {
        self.merger.get(self.selected_index)
    }

    /// The rows the renderer should draw this frame.
    pub fn visible_window(&self, height: usize) -> Vec<MatchedItem> {
        self.merger.slice(self.scroll_offset, self.scroll_offset + height)
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}
