//! grove library crate: conflict detection and merge-order planning for
//! branches checked out in git worktrees.
//!
//! The primary interface is the `grove` binary. This lib.rs exposes the
//! engine and its supporting modules so integration tests and benchmarks
//! can exercise them directly without going through the CLI.

pub mod analysis;
pub mod config;
pub mod format;
pub mod telemetry;
pub mod worktrees;
