//! Value types produced and consumed by the analysis engine.
//!
//! Everything here is created, consumed, and dropped within one invocation.
//! All types serialize to JSON for `--format json`.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// BranchDiff
// ---------------------------------------------------------------------------

/// The files one candidate branch changed since it diverged from the base.
///
/// `files` keeps the order git reported them in and holds no duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BranchDiff {
    /// The candidate branch.
    pub branch: String,
    /// Changed paths, relative to the repository root.
    pub files: Vec<String>,
}

impl BranchDiff {
    /// Create a diff, dropping duplicate paths while keeping first-seen order.
    pub fn new(branch: impl Into<String>, files: impl IntoIterator<Item = String>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let files = files
            .into_iter()
            .filter(|f| seen.insert(f.clone()))
            .collect();
        Self {
            branch: branch.into(),
            files,
        }
    }
}

// ---------------------------------------------------------------------------
// Severity / Overlap
// ---------------------------------------------------------------------------

/// How risky a shared file is, derived purely from how many branches touch it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Exactly two branches touch the file.
    Medium,
    /// Three or more branches touch the file.
    High,
}

impl Severity {
    /// Severity for a file touched by `branch_count` branches.
    ///
    /// Only meaningful for `branch_count >= 2`; overlaps never hold fewer.
    #[must_use]
    pub const fn for_branch_count(branch_count: usize) -> Self {
        if branch_count >= 3 { Self::High } else { Self::Medium }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A file modified by two or more candidate branches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overlap {
    /// The shared path.
    pub file: String,
    /// Branches touching `file`, in input order. Always at least two, unique.
    pub branches: Vec<String>,
    /// Risk classification (see [`Severity::for_branch_count`]).
    pub severity: Severity,
}

// ---------------------------------------------------------------------------
// CheckResult
// ---------------------------------------------------------------------------

/// Output of the overlap detector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Overlaps in first-encountered order.
    pub overlaps: Vec<Overlap>,
    /// Number of branch diffs analyzed, whether or not they overlap anything.
    pub total_branches: usize,
}

impl CheckResult {
    /// `true` when no file is shared between branches.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.overlaps.is_empty()
    }

    /// Number of overlaps classified as [`Severity::High`].
    #[must_use]
    pub fn high_count(&self) -> usize {
        self.overlaps
            .iter()
            .filter(|o| o.severity == Severity::High)
            .count()
    }
}

// ---------------------------------------------------------------------------
// DryMergeResult
// ---------------------------------------------------------------------------

/// Outcome of simulating a merge of two candidate branches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DryMergeResult {
    /// First branch of the pair (earlier in input order).
    pub branch1: String,
    /// Second branch of the pair.
    pub branch2: String,
    /// `true` iff the trial reported at least one conflicting path.
    pub has_conflicts: bool,
    /// Conflicting paths in the order the trial reported them.
    pub conflict_files: Vec<String>,
}

// ---------------------------------------------------------------------------
// MergeStep / MergePlan
// ---------------------------------------------------------------------------

/// One position in a recommended merge order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeStep {
    /// Branch to merge at this position.
    pub branch: String,
    /// Files it still shares with branches not yet merged when it is chosen.
    pub overlap_count: usize,
}

/// Recommended merge sequence for the contested branches.
///
/// Isolated branches are never listed here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    /// Steps in recommended order.
    pub steps: Vec<MergeStep>,
}

impl MergePlan {
    /// Branch names in plan order.
    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.branch.as_str())
    }
}
