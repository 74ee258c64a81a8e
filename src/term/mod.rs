//! Terminal backend abstraction
//! Provides a platform-agnostic interface for terminal operations.

/// ## term/ Invariants
///
/// - Terminal handling is isolated behind a strict abstraction boundary.
/// - Raw mode and the alternate screen are entered before input processing begins.
/// - Terminal state is restored on normal exit and on panic (via `deinit`).
/// - Terminal size queries are accurate at the time of use.
/// - Terminal code never depends on matcher/controller internals.
use crate::key::Key;

/// Terminal size information.
#[derive(Debug, Clone, Copy)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

/// Terminal backend trait. All terminal backends must implement these operations.
pub trait TerminalBackend {
    /// Initialize terminal: enter raw mode and the alternate screen.
    fn init(&mut self) -> Result<(), String>;

    /// Restore terminal to its original state.
    fn deinit(&mut self);

    /// Block until an input event is available, or until `duration` elapses.
    /// Returns `true` if an event is ready to be read.
    fn poll(&mut self, duration: std::time::Duration) -> Result<bool, String>;

    /// Read and decode a single input event.
    /// Returns `None` for events that do not map to a `Key` (e.g. key-release).
    fn read_key(&mut self) -> Result<Option<Key>, String>;

    /// Write bytes to the output buffer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), String>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<(), String>;

    /// Get terminal dimensions.
    fn get_size(&self) -> Result<Size, String>;

    /// Clear the entire screen.
    fn clear_screen(&mut self) -> Result<(), String>;

    /// Move cursor to the specified position (0-indexed).
    fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), String>;

    /// Hide the cursor.
    fn hide_cursor(&mut self) -> Result<(), String>;

    /// Show the cursor.
    fn show_cursor(&mut self) -> Result<(), String>;

    /// Clear from the cursor to the end of the current line.
    fn clear_to_end_of_line(&mut self) -> Result<(), String>;
}

/// Extension trait for color support. Backends that support colors implement this.
pub trait ColorTerminal: TerminalBackend {
    fn set_foreground_color(&mut self, color: crate::color::Color) -> Result<(), String>;
    fn set_background_color(&mut self, color: crate::color::Color) -> Result<(), String>;
    fn reset_colors(&mut self) -> Result<(), String>;
}

pub mod crossterm;
