//! Subcommand implementations and the repository context they share.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use grove::config::{GroveConfig, MAX_JOBS};
use grove::worktrees::{candidate_branches, detect_base_branch, explicit_candidates, list_worktrees};
use grove_git::{BranchName, CliGit};
use tracing::debug;

pub mod branches;
pub mod check;
pub mod plan;

/// Which branches to analyze, against which base.
#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Branches to analyze (default: every branch checked out in a worktree)
    pub branches: Vec<String>,

    /// Base branch (default: [repo] branch in .grove.toml, then origin/HEAD, then main)
    #[arg(long, short = 'b')]
    pub base: Option<String>,
}

/// Repository handle plus loaded configuration.
pub struct RepoContext {
    pub git: CliGit,
    pub config: GroveConfig,
}

impl RepoContext {
    /// Find the repository containing `start` and load its `.grove.toml`.
    pub fn open(start: &Path) -> Result<Self> {
        let git = CliGit::discover(start)
            .with_context(|| format!("{} is not inside a git repository", start.display()))?;
        let config = GroveConfig::load_from_root(git.repo_dir())
            .context("failed to load .grove.toml")?;
        debug!(root = %git.repo_dir().display(), "opened repository");
        Ok(Self { git, config })
    }

    /// Base branch: flag, then config, then `origin/HEAD`, then `main`.
    pub fn base(&self, flag: Option<&str>) -> Result<String> {
        let base = match flag.or(self.config.repo.branch.as_deref()) {
            Some(b) => b.to_owned(),
            None => detect_base_branch(&self.git),
        };
        let name = BranchName::new(&base).context("invalid base branch")?;
        Ok(name.as_str().to_owned())
    }

    /// Explicit names when given, otherwise every worktree branch.
    pub fn candidates(&self, selection: &Selection, base: &str) -> Result<Vec<String>> {
        if !selection.branches.is_empty() {
            return Ok(explicit_candidates(&selection.branches, base));
        }
        let entries = list_worktrees(&self.git).context("failed to list worktrees")?;
        Ok(candidate_branches(&entries, base))
    }

    /// Worker bound: flag, then config.
    pub fn jobs(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.config.analysis.jobs)
    }
}

/// clap value parser for `--jobs`.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if jobs == 0 || jobs > MAX_JOBS {
        return Err(format!("must be between 1 and {MAX_JOBS}"));
    }
    Ok(jobs)
}

/// `1 file` / `3 files`, `1 branch` / `2 branches`.
pub fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else if noun.ends_with("ch") || noun.ends_with('s') || noun.ends_with('x') {
        format!("{n} {noun}es")
    } else {
        format!("{n} {noun}s")
    }
}
