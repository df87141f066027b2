//! Scripted [`GitRunner`] double for engine unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use grove_git::{GitError, GitOutput, GitRunner};

/// Replies to exact argument lists with canned output and records every call.
///
/// An argument list with no script answers like git does for a bad revision:
/// exit 128 with a `fatal:` message.
#[derive(Default)]
pub struct ScriptedGit {
    replies: HashMap<Vec<String>, GitOutput>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, args: Vec<String>, output: GitOutput) -> Self {
        self.replies.insert(args, output);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitRunner for ScriptedGit {
    fn run(&self, args: &[&str], _cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        let key: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
        self.calls.lock().unwrap().push(key.clone());
        Ok(self.replies.get(&key).cloned().unwrap_or_else(|| {
            GitOutput::exited(128, "", format!("fatal: unscripted command: git {}\n", args.join(" ")))
        }))
    }
}

/// A runner whose process can never be spawned.
pub struct BrokenGit;

impl GitRunner for BrokenGit {
    fn run(&self, args: &[&str], _cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        Err(GitError::Io {
            command: format!("git {}", args.join(" ")),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
        })
    }
}
