//! [`CliGit`]: a [`GitRunner`] that shells out to the `git` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use crate::error::GitError;
use crate::runner::{GitOutput, GitRunner};

/// Runs git as a subprocess rooted at a fixed repository directory.
///
/// Every invocation runs with `LC_ALL=C` so messages such as
/// `CONFLICT (content): Merge conflict in <path>` are emitted untranslated,
/// and with `GIT_TERMINAL_PROMPT=0` so a misconfigured remote can never
/// block on a credential prompt.
#[derive(Clone, Debug)]
pub struct CliGit {
    program: OsString,
    repo_dir: PathBuf,
}

impl CliGit {
    /// Create a runner that executes `git` from `PATH` inside `repo_dir`.
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: OsString::from("git"),
            repo_dir: repo_dir.into(),
        }
    }

    /// Use a specific git executable instead of the one on `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// The directory commands run in when no `cwd` override is given.
    #[must_use]
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Discover the top level of the repository containing `start`.
    ///
    /// # Errors
    /// Returns [`GitError::CommandFailed`] if `start` is not inside a git
    /// work tree, or [`GitError::Io`] if git cannot be executed.
    pub fn discover(start: &Path) -> Result<Self, GitError> {
        let probe = Self::new(start);
        let out = probe.run_checked(
            &["rev-parse", "--path-format=absolute", "--show-toplevel"],
            None,
        )?;
        let top = out.stdout.trim();
        debug!(root = top, "discovered repository");
        Ok(Self {
            program: probe.program,
            repo_dir: PathBuf::from(top),
        })
    }
}

impl GitRunner for CliGit {
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        let dir = cwd.unwrap_or(&self.repo_dir);
        trace!(dir = %dir.display(), args = ?args, "git");
        let out = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| GitError::Io {
                command: format!("git {}", args.join(" ")),
                source,
            })?;
        Ok(GitOutput {
            status: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
