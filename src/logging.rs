//! File-backed `log` facade implementation.
//!
//! The terminal runs in the alternate screen for the session's whole
//! lifetime, so nothing may be written to stderr while a session is active:
//! a stray log line would corrupt the rendered frame. Log records are
//! instead appended to a plain file, one line per record.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct FileLogger {
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install a process-wide logger writing to `path`, filtered at `level`.
///
/// Opens `path` in append mode, creating it if necessary. Intended to be
/// called once from `main` before the terminal enters raw mode.
pub fn init(path: &std::path::Path, level: LevelFilter) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let logger = Box::new(FileLogger {
        file: Mutex::new(file),
    });
    log::set_max_level(level);
    set_logger(logger).map_err(|e| std::io::Error::other(e.to_string()))
}

fn set_logger(logger: Box<FileLogger>) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(logger)
}
