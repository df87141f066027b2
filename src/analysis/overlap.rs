//! Overlap detector: files touched by more than one candidate branch.
//!
//! Builds an inverted index from path → branches that changed it, then
//! reports every path with two or more branches as an [`Overlap`].
//!
//! # Example
//!
//! ```text
//! feature-a: shared.go, a.go
//! feature-b: shared.go, b.go
//! feature-c: c.go
//!
//! Inverted index (first-seen order):
//!   shared.go → [feature-a, feature-b]
//!   a.go      → [feature-a]
//!   b.go      → [feature-b]
//!   c.go      → [feature-c]
//!
//! Overlaps:
//!   shared.go  [feature-a, feature-b]  medium
//! total_branches = 3
//! ```
//!
//! # Determinism
//!
//! Paths are emitted in the order they are first encountered while scanning
//! branches in input order and each branch's files in diff order. Branch
//! lists inside an overlap follow input order too. No sorting is involved,
//! so the output is a pure function of the input sequence.

use std::collections::HashMap;

use tracing::debug;

use super::types::{BranchDiff, CheckResult, Overlap, Severity};

// ---------------------------------------------------------------------------
// PathIndex
// ---------------------------------------------------------------------------

/// Inverted index from path to the branches that changed it.
#[derive(Clone, Debug, Default)]
pub struct PathIndex {
    /// Paths in first-seen order.
    order: Vec<String>,
    /// Path → branches, each list in input order without duplicates.
    branches: HashMap<String, Vec<String>>,
}

impl PathIndex {
    /// Index a set of branch diffs.
    #[must_use]
    pub fn build(diffs: &[BranchDiff]) -> Self {
        let mut index = Self::default();
        for diff in diffs {
            for file in &diff.files {
                let entry = index.branches.entry(file.clone()).or_insert_with(|| {
                    index.order.push(file.clone());
                    Vec::new()
                });
                if !entry.contains(&diff.branch) {
                    entry.push(diff.branch.clone());
                }
            }
        }
        index
    }

    /// Iterate `(path, branches)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order.iter().map(|path| {
            let branches = self.branches.get(path).map_or(&[][..], Vec::as_slice);
            (path.as_str(), branches)
        })
    }

    /// Iterate only the paths touched by two or more branches.
    pub fn shared(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(_, branches)| branches.len() >= 2)
    }

    /// Total number of distinct paths.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.order.len()
    }
}

// ---------------------------------------------------------------------------
// detect_overlaps
// ---------------------------------------------------------------------------

/// Find every file changed by two or more branches and classify it.
///
/// `total_branches` is the number of diffs supplied, including branches that
/// share nothing. Empty input yields no overlaps and `total_branches == 0`.
#[must_use]
pub fn detect_overlaps(diffs: &[BranchDiff]) -> CheckResult {
    let index = PathIndex::build(diffs);
    let overlaps: Vec<Overlap> = index
        .shared()
        .map(|(file, branches)| Overlap {
            file: file.to_owned(),
            branches: branches.to_vec(),
            severity: Severity::for_branch_count(branches.len()),
        })
        .collect();
    debug!(
        branches = diffs.len(),
        paths = index.path_count(),
        shared = overlaps.len(),
        "detected overlaps"
    );

    CheckResult {
        overlaps,
        total_branches: diffs.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
