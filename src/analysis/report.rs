//! End-to-end entry points used by the `check` and `plan` commands.
//!
//! These wire the components together in dependency order:
//! collect → detect (→ simulate) for a conflict report, and
//! collect → detect → plan for a merge order.

use grove_git::GitRunner;
use serde::Serialize;
use tracing::{instrument, warn};

use super::collect::{collect_diffs, normalize_branch, normalize_candidates};
use super::dry_merge::simulate_all;
use super::error::AnalysisError;
use super::order::{PlanOutcome, plan};
use super::overlap::detect_overlaps;
use super::pool::DEFAULT_JOBS;
use super::types::{CheckResult, DryMergeResult};

/// Knobs for [`check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    /// Worker bound for diff collection and merge trials.
    pub jobs: usize,
    /// Also run the dry-merge simulator.
    pub dry_merge: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            dry_merge: false,
        }
    }
}

/// Everything `grove check` reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Base branch the candidates were compared against.
    pub base: String,
    /// Candidates analyzed, in input order.
    pub branches: Vec<String>,
    /// Path-level overlaps.
    #[serde(flatten)]
    pub check: CheckResult,
    /// Dry-merge evidence, when requested and available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_merges: Option<Vec<DryMergeResult>>,
    /// Why the simulator could not run, when it was requested but failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_merge_error: Option<String>,
}

/// Collect diffs, detect overlaps, and optionally simulate merges.
///
/// A simulator failure does not fail the report: the overlap result is still
/// returned with `dry_merge_error` set.
///
/// # Errors
///
/// Returns [`AnalysisError::CollectionFailed`] / [`AnalysisError::InvalidBranch`]
/// from diff collection; no partial report is produced.
#[instrument(skip_all, fields(base = base, branches = branches.len(), dry_merge = opts.dry_merge))]
pub fn check(
    git: &dyn GitRunner,
    base: &str,
    branches: &[String],
    opts: CheckOptions,
) -> Result<ConflictReport, AnalysisError> {
    let base = normalize_branch(base)?;
    let branches = normalize_candidates(branches)?;
    let diffs = collect_diffs(git, &base, &branches, opts.jobs)?;
    let check = detect_overlaps(&diffs);

    let (dry_merges, dry_merge_error) = if opts.dry_merge {
        match simulate_all(git, &branches, opts.jobs) {
            Ok(results) => (Some(results), None),
            Err(e) => {
                warn!(error = %e, "dry merge unavailable, reporting overlaps only");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(ConflictReport {
        base,
        branches,
        check,
        dry_merges,
        dry_merge_error,
    })
}

/// Collect diffs and plan a merge order.
///
/// With fewer than two candidates no git command runs and
/// [`PlanOutcome::NothingToPlan`] is returned.
///
/// # Errors
///
/// Propagates diff collection failures.
#[instrument(skip_all, fields(base = base, branches = branches.len()))]
pub fn plan_order(
    git: &dyn GitRunner,
    base: &str,
    branches: &[String],
    jobs: usize,
) -> Result<PlanOutcome, AnalysisError> {
    let branches = normalize_candidates(branches)?;
    if branches.len() < 2 {
        return Ok(plan(&CheckResult::default(), &branches));
    }
    let diffs = collect_diffs(git, base, &branches, jobs)?;
    let check = detect_overlaps(&diffs);
    Ok(plan(&check, &branches))
}
