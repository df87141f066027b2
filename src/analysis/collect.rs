//! Diff collector: the files each candidate branch changed since it forked.
//!
//! For every candidate, asks git for the paths that differ between the merge
//! base of `(base, candidate)` and the candidate's tip (a three-dot diff),
//! so work that landed on the base after the candidate diverged is not
//! attributed to the candidate.
//!
//! # Invariants
//!
//! - **Order**: one [`BranchDiff`] per candidate, in input order, whatever
//!   order the workers finish in.
//! - **All or nothing**: if any branch fails, the whole collection fails with
//!   [`AnalysisError::CollectionFailed`] naming that branch. Callers never see
//!   a partial diff set.

use grove_git::{BranchName, GitRunner};
use tracing::{debug, info, instrument};

use super::error::AnalysisError;
use super::pool::fan_out;
use super::types::BranchDiff;

/// Collect one [`BranchDiff`] per candidate branch, using up to `jobs`
/// concurrent git queries.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidBranch`] if the base or a candidate is not
/// a valid branch name, and [`AnalysisError::CollectionFailed`] for the first
/// candidate (by input order) whose diff could not be produced.
#[instrument(skip_all, fields(base = base, candidates = candidates.len()))]
pub fn collect_diffs(
    git: &dyn GitRunner,
    base: &str,
    candidates: &[String],
    jobs: usize,
) -> Result<Vec<BranchDiff>, AnalysisError> {
    let base = validate(base)?;
    let names = candidates
        .iter()
        .map(|c| validate(c))
        .collect::<Result<Vec<_>, _>>()?;

    let diffs = fan_out(&names, jobs, |branch| collect_one(git, &base, branch))?;

    info!(
        branches = diffs.len(),
        files = diffs.iter().map(|d| d.files.len()).sum::<usize>(),
        "collected branch diffs"
    );
    Ok(diffs)
}

/// Diff a single candidate against its merge base with `base`.
fn collect_one(
    git: &dyn GitRunner,
    base: &BranchName,
    branch: &BranchName,
) -> Result<BranchDiff, AnalysisError> {
    let range = format!("{base}...{branch}");
    let out = git
        .run(&["diff", "--name-only", "-z", "--no-renames", &range, "--"], None)
        .map_err(|e| AnalysisError::CollectionFailed {
            branch: branch.to_string(),
            reason: e.to_string(),
        })?;

    if !out.success() {
        let stderr = out.stderr.trim();
        return Err(AnalysisError::CollectionFailed {
            branch: branch.to_string(),
            reason: if stderr.is_empty() {
                format!("`git diff {range}` exited with {:?}", out.status)
            } else {
                stderr.to_owned()
            },
        });
    }

    let files = parse_name_only_z(&out.stdout);
    debug!(branch = %branch, files = files.len(), "branch diff");
    Ok(BranchDiff::new(branch.as_str(), files))
}

/// Split NUL-terminated `git diff --name-only -z` output into paths.
fn parse_name_only_z(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Validate candidate names and return them in the form the engine reports.
///
/// A leading `refs/heads/` is dropped, so `refs/heads/a` and `a` name the
/// same branch in diffs, overlaps, and plans.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidBranch`] for the first rejected name.
pub fn normalize_candidates(candidates: &[String]) -> Result<Vec<String>, AnalysisError> {
    candidates.iter().map(|c| normalize_branch(c)).collect()
}

/// Validate one branch name and drop a leading `refs/heads/`.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidBranch`] if `name` is rejected.
pub fn normalize_branch(name: &str) -> Result<String, AnalysisError> {
    validate(name).map(|b| b.as_str().to_owned())
}

fn validate(name: &str) -> Result<BranchName, AnalysisError> {
    BranchName::new(name).map_err(|e| AnalysisError::InvalidBranch {
        branch: name.to_owned(),
        reason: e.reason,
    })
}
