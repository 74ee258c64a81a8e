//! Command-line surface
//!
//! ## cli/ Invariants
//!
//! - Argument parsing never touches stdin, the TTY, or the matching kernel;
//!   it only produces a [`Cli`] value for `main` to act on.

use clap::Parser;

use crate::scheme::Scheme;

/// An interactive, terminal-based fuzzy finder.
#[derive(Debug, Parser)]
#[command(name = "glint", version, about)]
pub struct Cli {
    /// Enable multi-select: Tab toggles membership, Enter outputs every
    /// selected line (or the current line if none is selected).
    #[arg(long)]
    pub multi: bool,

    /// Disable ASCII case folding in the matcher and its bitmask prefilter.
    #[arg(long)]
    pub case_sensitive: bool,

    /// Cap the number of visible rows; defaults to the full terminal height.
    #[arg(long)]
    pub height: Option<u16>,

    /// Shell command template run against the current candidate; `{}` is
    /// substituted with the shell-quoted line.
    #[arg(long, conflicts_with = "preview_float")]
    pub preview: Option<String>,

    /// Like `--preview`, but rendered as a floating pane over the list.
    #[arg(long)]
    pub preview_float: Option<String>,

    /// Seed the query instead of starting empty.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Ranking tiebreaker policy.
    #[arg(long, default_value = "default")]
    pub scheme: Scheme,
}

impl Cli {
    /// The preview template in effect, if either `--preview` or
    /// `--preview-float` was given, along with whether it floats.
    pub fn preview_template(&self) -> Option<(&str, bool)> {
        if let Some(cmd) = &self.preview_float {
            Some((cmd.as_str(), true))
        } else {
            self.preview.as_deref().map(|cmd| (cmd, false))
        }
    }
}
