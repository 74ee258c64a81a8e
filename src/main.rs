//! Glint - an interactive, terminal-based fuzzy finder
//! Main entry point

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;

use glint::app::{App, Config, Outcome};
use glint::cli::Cli;
use glint::term::crossterm::CrosstermBackend;

fn log_path() -> PathBuf {
    env::var_os("GLINT_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("glint.log"))
}

fn log_level() -> LevelFilter {
    env::var("RUST_LOG")
        .ok()
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::Warn)
}

fn main() {
    if let Err(err) = glint::logging::init(&log_path(), log_level()) {
        eprintln!("warning: failed to initialize logger: {err}");
    }

    let cli = Cli::parse();

    let config = Config {
        multi: cli.multi,
        case_sensitive: cli.case_sensitive,
        height: cli.height,
        preview_template: cli.preview_template().map(|(cmd, _)| cmd.to_string()),
        scheme: cli.scheme,
    };

    let backend = match CrosstermBackend::new() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to create terminal backend: {e}");
            std::process::exit(2);
        }
    };

    let app = match App::new(backend, config, io::stdin(), &cli.query) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize glint: {e}");
            std::process::exit(2);
        }
    };

    let outcome = match app.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("glint error: {e}");
            std::process::exit(2);
        }
    };

    match outcome {
        Outcome::Accepted(lines) => {
            if lines.is_empty() {
                std::process::exit(1);
            }
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for line in &lines {
                let _ = writeln!(handle, "{line}");
            }
            std::process::exit(0);
        }
        Outcome::Cancelled => std::process::exit(1),
        Outcome::Interrupted => std::process::exit(130),
    }
}
