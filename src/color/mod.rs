//! Terminal color representation
//!
//! A thin wrapper around crossterm's color enum, kept separate so the
//! rendering and matching layers never depend on crossterm directly.

use crossterm::style::Color as CrosstermColor;

/// Color representation wrapping crossterm's Color enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Reset,
    Black,
    DarkGrey,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Grey,
}

impl Color {
    #[must_use]
    pub fn to_crossterm(self) -> CrosstermColor {
        match self {
            Color::Reset => CrosstermColor::Reset,
            Color::Black => CrosstermColor::Black,
            Color::DarkGrey => CrosstermColor::DarkGrey,
            Color::Red => CrosstermColor::Red,
            Color::Green => CrosstermColor::Green,
            Color::Yellow => CrosstermColor::Yellow,
            Color::Blue => CrosstermColor::Blue,
            Color::Magenta => CrosstermColor::Magenta,
            Color::Cyan => CrosstermColor::Cyan,
            Color::White => CrosstermColor::White,
            Color::Grey => CrosstermColor::Grey,
        }
    }
}
