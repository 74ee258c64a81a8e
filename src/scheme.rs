//! Ranking tiebreak policy

use std::str::FromStr;

use clap::ValueEnum;

/// Controls which fields of [`crate::merger::MatchedItem::points`] are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scheme {
    /// Tiebreak by score, then byte length.
    #[default]
    Default,
    /// Tiebreak by score, then distance of the match from the last path
    /// separator, then byte length.
    Path,
    /// Tiebreak by score only.
    History,
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Scheme::Default),
            "path" => Ok(Scheme::Path),
            "history" => Ok(Scheme::History),
            other => Err(format!("unknown scheme '{other}' (expected default|path|history)")),
        }
    }
}
