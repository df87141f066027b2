//! Value types shared between the [`GitRunner`](crate::GitRunner) trait and grove.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// BranchName
// ---------------------------------------------------------------------------

/// A local branch name, validated before it is used as a git argument.
///
/// The rules are a practical subset of `git check-ref-format --branch`:
/// enough to guarantee the name cannot be mistaken for an option or a
/// revision range when spliced into `git diff a...b` or `git merge-tree a b`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new `BranchName`, validating it.
    ///
    /// A leading `refs/heads/` is stripped so porcelain output can be passed
    /// straight through.
    ///
    /// # Errors
    /// Returns an error if the name is empty, starts with `-` or `/`, contains
    /// whitespace, control characters, `..`, `@{`, or one of `~^:?*[\`, or
    /// ends with `/`, `.` or `.lock`.
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        let name = name.strip_prefix("refs/heads/").unwrap_or(name);
        Self::validate(name)?;
        Ok(Self(name.to_owned()))
    }

    /// Return the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), BranchNameError> {
        let reject = |reason: &str| {
            Err(BranchNameError {
                value: name.to_owned(),
                reason: reason.to_owned(),
            })
        };

        if name.is_empty() {
            return reject("branch name must not be empty");
        }
        if name.starts_with('-') {
            return reject("branch name must not start with '-'");
        }
        if name.starts_with('/') || name.ends_with('/') {
            return reject("branch name must not start or end with '/'");
        }
        if name.ends_with('.') || name.ends_with(".lock") {
            return reject("branch name must not end with '.' or '.lock'");
        }
        if name.contains("..") {
            return reject("branch name must not contain '..'");
        }
        if name.contains("@{") {
            return reject("branch name must not contain '@{'");
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
        {
            return reject("branch name contains a character git does not allow");
        }
        Ok(())
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BranchName {
    type Err = BranchNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error from validating a [`BranchName`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid branch name {value:?}: {reason}")]
pub struct BranchNameError {
    /// The invalid value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}
