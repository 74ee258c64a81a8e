//! Preview subprocess runner
//!
//! ## preview/ Invariants
//!
//! - The selected candidate is substituted for a literal `{}` token in the
//!   preview command, shell-quoted so it is always passed as a single
//!   argument, never interpreted as additional shell syntax.
//! - A preview that exceeds [`PREVIEW_TIMEOUT`] is killed and reported as
//!   pane text, never a fatal error: the finder keeps running either way.
//! - Output is capped at [`MAX_OUTPUT_BYTES`]; anything past the cap is
//!   dropped, not buffered.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const PREVIEW_TIMEOUT: Duration = Duration::from_secs(2);
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Result of running a preview command against one candidate.
#[derive(Debug, Clone)]
pub enum PreviewOutcome {
    Output(String),
    TimedOut,
    Failed(String),
}

/// Quote `candidate` as a single POSIX shell word: wrap in single quotes,
/// escaping any embedded single quote as `'\''`.
fn shell_quote(candidate: &str) -> String {
    let mut quoted = String::with_capacity(candidate.len() + 2);
    quoted.push('\'');
    for ch in candidate.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Substitute every literal `{}` in `template` with the shell-quoted candidate.
fn build_command(template: &str, candidate: &str) -> String {
    template.replace("{}", &shell_quote(candidate))
}

/// Run `template` against `candidate` via `sh -c`, enforcing the timeout and
/// output cap. Blocks the calling thread; callers dispatch this through the
/// job manager rather than calling it from the event loop directly.
pub fn run(template: &str, candidate: &str) -> PreviewOutcome {
    let command_line = build_command(template, candidate);

    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(&command_line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => return PreviewOutcome::Failed(err.to_string()),
    };

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let (sender, receiver) = mpsc::channel();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.take(MAX_OUTPUT_BYTES as u64).read_to_end(&mut buf);
        }
        if buf.is_empty() {
            if let Some(err) = stderr.as_mut() {
                let _ = err.take(MAX_OUTPUT_BYTES as u64).read_to_end(&mut buf);
            }
        }
        let _ = sender.send(buf);
    });

    match receiver.recv_timeout(PREVIEW_TIMEOUT) {
        Ok(bytes) => {
            let _ = child.wait();
            let _ = reader.join();
            PreviewOutcome::Output(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            let _ = child.kill();
            let _ = child.wait();
            PreviewOutcome::TimedOut
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = child.wait();
            PreviewOutcome::Failed("preview process produced no output".to_string())
        }
    }
}
