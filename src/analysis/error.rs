//! Error types for the analysis engine.

use thiserror::Error;

/// Errors that abort an analysis run.
///
/// A dry merge that *finds* conflicts is not an error; it is a
/// [`DryMergeResult`](super::DryMergeResult) with `has_conflicts: true`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No diff could be produced for a candidate branch (missing merge base,
    /// branch deleted mid-run, git not runnable). Fatal for the whole run.
    #[error("could not collect changes for branch '{branch}': {reason}")]
    CollectionFailed {
        /// The branch whose diff failed.
        branch: String,
        /// Underlying error message.
        reason: String,
    },

    /// The merge trial could not execute at all (git too old, capability
    /// missing). Distinct from "ran and found conflicts".
    #[error("dry merge of '{branch1}' and '{branch2}' could not run: {reason}")]
    SimulationUnavailable {
        /// First branch of the pair.
        branch1: String,
        /// Second branch of the pair.
        branch2: String,
        /// Underlying error message.
        reason: String,
    },

    /// A candidate name was rejected before reaching git.
    #[error("invalid candidate branch '{branch}': {reason}")]
    InvalidBranch {
        /// The rejected name.
        branch: String,
        /// Why it was rejected.
        reason: String,
    },
}
