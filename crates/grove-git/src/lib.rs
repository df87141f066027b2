//! Git command capability for grove.
//!
//! This crate defines the [`GitRunner`] trait, the single interface through
//! which grove talks to version control. The analysis engine never spawns
//! `git` itself; it is handed a `&dyn GitRunner` and programs against it, so
//! tests can swap in a scripted double and other backends can be plugged in
//! without touching the engine.
//!
//! # Crate layout
//!
//! - [`runner`]: the [`GitRunner`] trait and its captured [`GitOutput`].
//! - [`cli`]: [`CliGit`], the subprocess-backed implementation.
//! - [`types`]: value types used in trait signatures ([`BranchName`]).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.

pub mod cli;
pub mod error;
pub mod runner;
pub mod types;

// Re-export the main trait and commonly used types at the crate root for
// ergonomic imports: `use grove_git::{GitRunner, CliGit, GitError};`
pub use cli::CliGit;
pub use error::GitError;
pub use runner::{GitOutput, GitRunner};
pub use types::{BranchName, BranchNameError};
