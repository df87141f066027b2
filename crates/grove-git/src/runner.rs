//! The [`GitRunner`] trait: the abstraction boundary between grove and git.
//!
//! The contract is deliberately small: accept an argument list (and
//! optionally a working directory), execute the version-control tool, and
//! hand back the captured text together with the exit status. Subprocess
//! invocation ([`CliGit`](crate::CliGit)), a library binding, or an RPC
//! client all satisfy it.
//!
//! Implementations must be safe to call from several threads at once. grove
//! only issues read-only queries (`diff`, `merge-tree`, `worktree list`), so
//! concurrent calls never contend on repository state.

use std::path::Path;

use crate::error::GitError;

/// Captured result of one git invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    /// Captured stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Captured stderr, lossily decoded as UTF-8.
    pub stderr: String,
}

impl GitOutput {
    /// Build a successful output with the given stdout (handy for test doubles).
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Build an output that exited with `code`.
    #[must_use]
    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// `true` if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// Executes git commands on behalf of grove.
///
/// # Object safety
///
/// This trait is object-safe: callers hold `&dyn GitRunner` and may share it
/// across scoped worker threads (hence the `Send + Sync` bound).
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` and capture its output.
    ///
    /// `cwd` overrides the runner's default directory for this call.
    ///
    /// # Errors
    /// Returns [`GitError::Io`] only when the command could not be executed
    /// at all. A non-zero exit is reported through [`GitOutput::status`].
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput, GitError>;

    /// Like [`run`](Self::run), but a non-zero exit becomes
    /// [`GitError::CommandFailed`].
    ///
    /// # Errors
    /// Returns [`GitError::Io`] or [`GitError::CommandFailed`].
    fn run_checked(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        let output = self.run(args, cwd)?;
        if output.success() {
            Ok(output)
        } else {
            Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: output.stderr.trim().to_owned(),
                exit_code: output.status,
            })
        }
    }
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        (**self).run(args, cwd)
    }
}
