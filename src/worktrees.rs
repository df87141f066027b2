//! Candidate-branch enumeration from `git worktree list --porcelain`.
//!
//! The porcelain format is one record per worktree, records separated by a
//! blank line:
//!
//! ```text
//! worktree /repo
//! HEAD 3f2a...
//! branch refs/heads/main
//!
//! worktree /repo/.trees/feature-a
//! HEAD 91bc...
//! branch refs/heads/feature-a
//! locked reason text
//! ```
//!
//! `bare`, `detached`, `locked [reason]` and `prunable [reason]` appear as
//! bare attribute lines.

use std::collections::HashSet;
use std::path::PathBuf;

use grove_git::{GitError, GitRunner};
use serde::Serialize;
use tracing::{debug, instrument};

/// Base branch used when neither config nor `origin/HEAD` names one.
pub const FALLBACK_BASE: &str = "main";

/// One worktree as reported by git.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorktreeEntry {
    /// Absolute path of the working tree.
    pub path: PathBuf,
    /// Commit checked out, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    /// Checked-out branch without the `refs/heads/` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: bool,
    /// The worktree directory no longer exists.
    pub prunable: bool,
}

/// List every worktree of the repository.
///
/// # Errors
/// Returns [`GitError`] if `git worktree list` cannot run or fails.
#[instrument(skip_all)]
pub fn list_worktrees(git: &dyn GitRunner) -> Result<Vec<WorktreeEntry>, GitError> {
    let out = git.run_checked(&["worktree", "list", "--porcelain"], None)?;
    let entries = parse_porcelain(&out.stdout);
    debug!(count = entries.len(), "listed worktrees");
    Ok(entries)
}

/// Parse `git worktree list --porcelain` output.
#[must_use]
pub fn parse_porcelain(text: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in text.lines() {
        if line.is_empty() {
            entries.extend(current.take());
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        if key == "worktree" {
            entries.extend(current.take());
            current = Some(WorktreeEntry {
                path: PathBuf::from(value),
                ..WorktreeEntry::default()
            });
            continue;
        }
        // Attribute lines before any `worktree` line are malformed; skip them.
        let Some(entry) = current.as_mut() else {
            continue;
        };
        match key {
            "HEAD" => entry.head = Some(value.to_owned()),
            "branch" => {
                let name = value.strip_prefix("refs/heads/").unwrap_or(value);
                entry.branch = Some(name.to_owned());
            }
            "bare" => entry.bare = true,
            "detached" => entry.detached = true,
            "locked" => entry.locked = true,
            "prunable" => entry.prunable = true,
            _ => {}
        }
    }
    entries.extend(current);
    entries
}

/// Branches worth analyzing, in worktree order.
///
/// Skips bare and detached entries, prunable worktrees, the base branch, and
/// repeats of a branch already listed.
#[must_use]
pub fn candidate_branches(entries: &[WorktreeEntry], base: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| !e.bare && !e.detached && !e.prunable)
        .filter_map(|e| e.branch.as_deref())
        .filter(|b| *b != base)
        .filter(|b| seen.insert(*b))
        .map(str::to_owned)
        .collect()
}

/// Branches named on the command line, de-duplicated, base removed.
#[must_use]
pub fn explicit_candidates(names: &[String], base: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.strip_prefix("refs/heads/").unwrap_or(n))
        .filter(|n| *n != base)
        .filter(|n| seen.insert(*n))
        .map(str::to_owned)
        .collect()
}

/// Guess the base branch from `refs/remotes/origin/HEAD`, else [`FALLBACK_BASE`].
///
/// Any failure (no remote, unset symbolic ref, git missing) falls back.
#[must_use]
pub fn detect_base_branch(git: &dyn GitRunner) -> String {
    let detected = git
        .run(
            &["symbolic-ref", "--quiet", "--short", "refs/remotes/origin/HEAD"],
            None,
        )
        .ok()
        .filter(grove_git::GitOutput::success)
        .and_then(|out| {
            let short = out.stdout.trim();
            short
                .strip_prefix("origin/")
                .filter(|b| !b.is_empty())
                .map(str::to_owned)
        });
    match detected {
        Some(branch) => {
            debug!(branch, "base branch from origin/HEAD");
            branch
        }
        None => FALLBACK_BASE.to_owned(),
    }
}
