//! Conflict-detection and merge-order-planning engine.
//!
//! Four read-only components, leaves first:
//!
//! - **collect**: three-dot diff per candidate branch → [`BranchDiff`]s.
//! - **overlap**: inverted path index → [`CheckResult`] of shared files.
//! - **dry_merge**: pairwise `git merge-tree` trials → [`DryMergeResult`]s.
//! - **order**: greedy least-contested-first sequencing → [`MergePlan`].
//!
//! Nothing here writes to the repository or keeps state between calls;
//! every run is computed fresh from the refs as they are now. All git access
//! goes through a `&dyn GitRunner`.
//!
//! # Determinism guarantee
//!
//! Given the same diffs in the same order, overlap detection and planning
//! always produce the same output. Diff collection and merge trials fan out
//! over a bounded pool but write into index-addressed slots, so concurrency
//! never changes ordering.

pub mod collect;
pub mod dry_merge;
pub mod error;
pub mod order;
pub mod overlap;
pub mod pool;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use collect::collect_diffs;
pub use dry_merge::simulate_all;
pub use error::AnalysisError;
pub use order::{PlanOutcome, isolated_branches, plan, plan_merge_order};
pub use overlap::detect_overlaps;
pub use report::{CheckOptions, ConflictReport, check, plan_order};
pub use types::{BranchDiff, CheckResult, DryMergeResult, MergePlan, MergeStep, Overlap, Severity};
