//! Error types for git operations.
//!
//! [`GitError`] is the single error type returned by [`GitRunner`](crate::GitRunner)
//! methods. A command that ran and exited non-zero is *not* an error at the
//! trait level; it comes back as a [`GitOutput`](crate::GitOutput) so callers
//! can interpret the output themselves. [`GitError::CommandFailed`] only
//! appears when a caller opts into [`run_checked`](crate::GitRunner::run_checked).

use thiserror::Error;

/// Errors returned by [`GitRunner`](crate::GitRunner) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git process could not be spawned or its output could not be read.
    #[error("failed to run `{command}`: {source}")]
    Io {
        /// The command line that was attempted.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A git command ran but exited with a non-zero status.
    #[error("`{command}` failed{}", failure_detail(.exit_code, .stderr))]
    CommandFailed {
        /// The command line that was run (e.g. `"git diff --name-only main...topic"`).
        command: String,
        /// Captured stderr, trimmed.
        stderr: String,
        /// Process exit code, if the process was not killed by a signal.
        exit_code: Option<i32>,
    },
}

fn failure_detail(exit_code: &Option<i32>, stderr: &str) -> String {
    let mut detail = String::new();
    if let Some(code) = exit_code {
        detail.push_str(&format!(" (exit {code})"));
    }
    if !stderr.is_empty() {
        detail.push_str(": ");
        detail.push_str(stderr);
    }
    detail
}
