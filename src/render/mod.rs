//! Terminal rendering of one UI frame
//!
//! ## render/ Invariants
//!
//! - Rendering never mutates matching state; it only reads a pre-sliced
//!   window of [`crate::merger::MatchedItem`]s plus their highlight positions.
//! - A character is drawn highlighted if any of its bytes falls in the row's
//!   matched-position set; a match that splits a multi-byte character never
//!   causes a partial escape sequence to be written mid-character.

use std::collections::HashSet;

use unicode_width::UnicodeWidthChar;

use crate::color::Color;
use crate::error::{ErrorKind, FinderError};
use crate::term::{ColorTerminal, Size, TerminalBackend};

/// One visible row: its display text, the byte offsets (within that text)
/// the matcher reported, and whether it is part of the multi-select set.
pub struct RenderRow {
    pub text: String,
    pub positions: Vec<u16>,
    pub multi_selected: bool,
}

/// Everything needed to draw one frame.
pub struct Frame<'a> {
    pub query: &'a str,
    pub cursor_position: usize,
    pub rows: Vec<RenderRow>,
    pub highlighted_row: usize,
    pub match_count: usize,
    pub total_items: u32,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame) -> Result<(), FinderError>;
    fn size(&self) -> Result<Size, FinderError>;
}

fn term_err(e: String) -> FinderError {
    FinderError::new(ErrorKind::Terminal, "TERM_IO", e)
}

fn byte_index_for(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}

/// Concrete renderer over any color-capable [`TerminalBackend`].
pub struct TerminalRenderer<T> {
    backend: T,
}

impl<T: TerminalBackend + ColorTerminal> TerminalRenderer<T> {
    pub fn new(backend: T) -> Self {
        Self { backend }
    }

    pub fn backend_mut(&mut self) -> &mut T {
        &mut self.backend
    }

    pub fn into_backend(self) -> T {
        self.backend
    }

    fn draw_row(&mut self, row: &RenderRow, selected: bool, width: u16) -> Result<(), FinderError> {
        let positions: HashSet<u16> = row.positions.iter().copied().collect();

        if selected {
            self.backend
                .set_background_color(Color::DarkGrey)
                .map_err(term_err)?;
        }

        let marker: &str = if row.multi_selected { "* " } else { "  " };
        self.backend.write(marker.as_bytes()).map_err(term_err)?;
        let mut consumed_width: u16 = 2;

        for (byte_idx, ch) in row.text.char_indices() {
            if consumed_width >= width {
                break;
            }
            let highlighted = (byte_idx..byte_idx + ch.len_utf8())
                .any(|b| positions.contains(&(b.min(u16::MAX as usize) as u16)));

            if highlighted {
                self.backend.set_foreground_color(Color::Yellow).map_err(term_err)?;
            }
            let mut buf = [0u8; 4];
            self.backend
                .write(ch.encode_utf8(&mut buf).as_bytes())
                .map_err(term_err)?;
            if highlighted {
                self.backend.reset_colors().map_err(term_err)?;
                if selected {
                    self.backend
                        .set_background_color(Color::DarkGrey)
                        .map_err(term_err)?;
                }
            }
            consumed_width += ch.width().unwrap_or(0) as u16;
        }

        if selected {
            self.backend.reset_colors().map_err(term_err)?;
        }
        Ok(())
    }
}

impl<T: TerminalBackend + ColorTerminal> Renderer for TerminalRenderer<T> {
    fn size(&self) -> Result<Size, FinderError> {
        self.backend.get_size().map_err(term_err)
    }

    fn render(&mut self, frame: &Frame) -> Result<(), FinderError> {
        let size = self.backend.get_size().map_err(term_err)?;
        let rows_available = size.rows.saturating_sub(1) as usize;

        self.backend.hide_cursor().map_err(term_err)?;
        for row_idx in 0..rows_available {
            self.backend.move_cursor(row_idx as u16, 0).map_err(term_err)?;
            self.backend.clear_to_end_of_line().map_err(term_err)?;
            if let Some(row) = frame.rows.get(row_idx) {
                self.draw_row(row, row_idx == frame.highlighted_row, size.cols)?;
            }
        }

        let prompt_row = rows_available as u16;
        self.backend.move_cursor(prompt_row, 0).map_err(term_err)?;
        self.backend.clear_to_end_of_line().map_err(term_err)?;
        let status = format!("  {}/{}", frame.match_count, frame.total_items);
        let prompt = format!("> {}{}", frame.query, status);
        self.backend.write(prompt.as_bytes()).map_err(term_err)?;

        let cursor_col = 2 + byte_index_for(frame.query, frame.cursor_position) as u16;
        self.backend
            .move_cursor(prompt_row, cursor_col.min(size.cols.saturating_sub(1)))
            .map_err(term_err)?;
        self.backend.show_cursor().map_err(term_err)?;
        self.backend.flush().map_err(term_err)?;
        Ok(())
    }
}
