//! Merge order planner: greedy minimum-remaining-degree sequencing.
//!
//! A branch's *degree* is the number of distinct files it shares with at
//! least one other branch. Merging a branch turns its shared files into base
//! content, so those files stop counting against everyone merged after it.
//! The planner repeatedly picks the contested branch with the smallest degree
//! measured only against branches still waiting, which can only lower the
//! remaining branches' degrees.
//!
//! # Tie-break
//!
//! When several unplaced branches share the minimum current degree, the one
//! that appears first in the caller's candidate list wins. The result is
//! therefore fully determined by the input order.
//!
//! # Isolated branches
//!
//! Branches with an initial degree of zero never enter the plan. Use
//! [`isolated_branches`] to list them separately; they can merge in any order.

use std::collections::HashSet;

use tracing::{debug, instrument};

use super::types::{CheckResult, MergePlan, MergeStep};

/// Outcome of a planning request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Fewer than two candidates: there is no order to choose.
    NothingToPlan {
        /// The candidates that were supplied (zero or one).
        branches: Vec<String>,
    },
    /// A plan for the contested branches plus the isolated remainder.
    Planned {
        /// Recommended order for contested branches.
        plan: MergePlan,
        /// Branches sharing no file with any other candidate, in input order.
        isolated: Vec<String>,
    },
}

/// Plan a merge order, treating fewer than two candidates as informational.
#[must_use]
pub fn plan(check: &CheckResult, branches: &[String]) -> PlanOutcome {
    if branches.len() < 2 {
        return PlanOutcome::NothingToPlan {
            branches: branches.to_vec(),
        };
    }
    PlanOutcome::Planned {
        plan: plan_merge_order(check, branches),
        isolated: isolated_branches(check, branches),
    }
}

/// Compute the recommended merge order for the contested branches.
///
/// Each step records the branch's degree at the moment it was chosen. The
/// last contested branch therefore always records zero.
#[must_use]
#[instrument(skip_all, fields(branches = branches.len(), overlaps = check.overlaps.len()))]
pub fn plan_merge_order(check: &CheckResult, branches: &[String]) -> MergePlan {
    let mut unplaced: Vec<&str> = branches
        .iter()
        .map(String::as_str)
        .filter(|b| initial_degree(check, b) > 0)
        .collect();
    dedup_in_order(&mut unplaced);

    let mut steps = Vec::with_capacity(unplaced.len());
    while !unplaced.is_empty() {
        let waiting: HashSet<&str> = unplaced.iter().copied().collect();

        // Strict `<` keeps the earliest branch on ties.
        let mut best = 0;
        let mut best_degree = current_degree(check, unplaced[0], &waiting);
        for (i, branch) in unplaced.iter().enumerate().skip(1) {
            let degree = current_degree(check, branch, &waiting);
            if degree < best_degree {
                best = i;
                best_degree = degree;
            }
        }

        let branch = unplaced.remove(best);
        debug!(branch, overlap_count = best_degree, "placed");
        steps.push(MergeStep {
            branch: branch.to_owned(),
            overlap_count: best_degree,
        });
    }

    MergePlan { steps }
}

/// Candidates that share no file with any other candidate, in input order.
#[must_use]
pub fn isolated_branches(check: &CheckResult, branches: &[String]) -> Vec<String> {
    let mut isolated: Vec<&str> = branches
        .iter()
        .map(String::as_str)
        .filter(|b| initial_degree(check, b) == 0)
        .collect();
    dedup_in_order(&mut isolated);
    isolated.into_iter().map(str::to_owned).collect()
}

/// Number of distinct files `branch` shares with at least one other branch.
#[must_use]
pub fn initial_degree(check: &CheckResult, branch: &str) -> usize {
    check
        .overlaps
        .iter()
        .filter(|o| o.branches.iter().any(|b| b == branch))
        .count()
}

/// Files `branch` shares with at least one *other* branch still in `waiting`.
fn current_degree(check: &CheckResult, branch: &str, waiting: &HashSet<&str>) -> usize {
    check
        .overlaps
        .iter()
        .filter(|o| o.branches.iter().any(|b| b == branch))
        .filter(|o| {
            o.branches
                .iter()
                .any(|b| b != branch && waiting.contains(b.as_str()))
        })
        .count()
}

fn dedup_in_order(list: &mut Vec<&str>) {
    let mut seen = HashSet::new();
    list.retain(|b| seen.insert(*b));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
