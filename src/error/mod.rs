//! Centralized error handling
//! Defines common error types, severity levels, and error codes.

use std::fmt;

/// Severity level of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational message (not really an error).
    Info,
    /// Warning - something might be wrong but the program can continue.
    Warning,
    /// Standard error - the failing operation is abandoned but the program continues.
    Error,
    /// Critical error - the program cannot continue and must exit.
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Standard input / standard output failures.
    Io,
    /// Terminal backend failures (TTY acquisition, raw mode, resize queries).
    Terminal,
    /// Preview subprocess failures (non-fatal; rendered inside the preview pane).
    Preview,
    /// Internal logic or invariant violations.
    Internal,
    /// Errors that don't fit other categories.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "IO"),
            Self::Terminal => write!(f, "Terminal"),
            Self::Preview => write!(f, "Preview"),
            Self::Internal => write!(f, "Internal"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A structured error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderError {
    /// How serious the error is.
    pub severity: ErrorSeverity,
    /// What kind of error occurred.
    pub kind: ErrorKind,
    /// Machine-readable error code (e.g. "E001", "TTY_UNAVAILABLE").
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl FinderError {
    /// Create a new standard error (severity: Error).
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new critical error (severity: Critical).
    pub fn critical(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Critical,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new warning (severity: Warning).
    pub fn warning(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if the message contains a substring (useful for tests).
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }

    /// Whether this error should terminate the process (vs. being logged and handled in place).
    pub fn is_fatal(&self) -> bool {
        self.severity == ErrorSeverity::Critical
    }
}

impl fmt::Display for FinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.severity, self.kind, self.code, self.message
        )
    }
}

impl std::error::Error for FinderError {}

impl From<String> for FinderError {
    fn from(msg: String) -> Self {
        Self::new(ErrorKind::Other, "GENERIC_ERROR", msg)
    }
}

impl From<&str> for FinderError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorKind::Other, "GENERIC_ERROR", msg)
    }
}

impl From<std::io::Error> for FinderError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, "IO_ERROR", err.to_string())
    }
}

/// Result alias for fallible operations.
pub type Result<T> = std::result::Result<T, FinderError>;
