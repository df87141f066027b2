//! Dry-merge simulator: predict real content conflicts between branch pairs.
//!
//! For every unordered pair of candidates, runs a three-way merge trial with
//! `git merge-tree --write-tree`, which computes the merge entirely in the
//! object database: no working tree, index, or ref is touched. The textual
//! output is scanned for `CONFLICT (...)` notices.
//!
//! # Exit status is not the verdict
//!
//! `git merge-tree` exits 1 when it finds conflicts. That is an expected,
//! meaningful result, not a failure, so the verdict comes from the output:
//!
//! | markers in output | exit status | outcome                                   |
//! |-------------------|-------------|-------------------------------------------|
//! | yes               | any         | `has_conflicts: true`                     |
//! | no                | 0           | `has_conflicts: false`                    |
//! | no                | non-zero    | [`AnalysisError::SimulationUnavailable`] |
//!
//! This evidence is reported next to the overlap detector's output, never
//! folded into it: a shared path may merge cleanly.

use grove_git::{BranchName, GitRunner};
use tracing::{debug, info, instrument};

use super::error::AnalysisError;
use super::pool::fan_out;
use super::types::DryMergeResult;

const CONFLICT_PREFIX: &str = "CONFLICT (";
const CONTENT_MARKER: &str = "Merge conflict in ";

/// Simulate a merge for every unordered pair of `branches`.
///
/// Pairs are produced in input order: `(b0,b1), (b0,b2), …, (b1,b2), …`.
/// Fewer than two branches yields an empty list without running git.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidBranch`] for a name git must not see, and
/// [`AnalysisError::SimulationUnavailable`] for the first pair whose trial
/// could not run at all.
#[instrument(skip_all, fields(branches = branches.len()))]
pub fn simulate_all(
    git: &dyn GitRunner,
    branches: &[String],
    jobs: usize,
) -> Result<Vec<DryMergeResult>, AnalysisError> {
    let names = branches
        .iter()
        .map(|b| {
            BranchName::new(b).map_err(|e| AnalysisError::InvalidBranch {
                branch: b.clone(),
                reason: e.reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pairs = unordered_pairs(&names);
    let results = fan_out(&pairs, jobs, |(a, b)| simulate_pair(git, a, b))?;

    info!(
        pairs = results.len(),
        conflicting = results.iter().filter(|r| r.has_conflicts).count(),
        "dry merges complete"
    );
    Ok(results)
}

/// Run one merge trial between `branch1` and `branch2`.
///
/// # Errors
///
/// Returns [`AnalysisError::SimulationUnavailable`] when git cannot be run
/// or exits non-zero without reporting any conflict.
pub fn simulate_pair(
    git: &dyn GitRunner,
    branch1: &BranchName,
    branch2: &BranchName,
) -> Result<DryMergeResult, AnalysisError> {
    let unavailable = |reason: String| AnalysisError::SimulationUnavailable {
        branch1: branch1.to_string(),
        branch2: branch2.to_string(),
        reason,
    };

    let out = git
        .run(
            &[
                "merge-tree",
                "--write-tree",
                "--name-only",
                "--messages",
                branch1.as_str(),
                branch2.as_str(),
            ],
            None,
        )
        .map_err(|e| unavailable(e.to_string()))?;

    let conflict_files = parse_conflicts(&out.stdout);
    let has_conflicts = !conflict_files.is_empty();

    if !has_conflicts && !out.success() {
        let stderr = out.stderr.trim();
        return Err(unavailable(if stderr.is_empty() {
            format!("`git merge-tree` exited with {:?}", out.status)
        } else {
            stderr.to_owned()
        }));
    }

    debug!(
        branch1 = %branch1,
        branch2 = %branch2,
        conflicts = conflict_files.len(),
        "dry merge"
    );
    Ok(DryMergeResult {
        branch1: branch1.to_string(),
        branch2: branch2.to_string(),
        has_conflicts,
        conflict_files,
    })
}

/// Extract conflicting paths from `git merge-tree --write-tree --name-only` output.
///
/// Output layout:
///
/// ```text
/// <tree oid>
/// <conflicted path>        ┐ only present when there are conflicts
/// ...                      ┘
/// <blank line>
/// Auto-merging shared.go
/// CONFLICT (content): Merge conflict in shared.go
/// ```
///
/// Paths named by `Merge conflict in <path>` notices come first, in notice
/// order. If other conflict kinds (modify/delete, rename/rename, …) are
/// present, the paths they leave in the conflicted-file section are appended.
/// Returns an empty list when no `CONFLICT (` notice exists.
fn parse_conflicts(stdout: &str) -> Vec<String> {
    let mut lines = stdout.lines();
    // First line is the tree OID; the conflicted-file section follows until
    // the first blank line.
    let _tree = lines.next();
    let listed: Vec<&str> = lines.by_ref().take_while(|l| !l.is_empty()).collect();

    let mut files: Vec<String> = Vec::new();
    let mut saw_marker = false;
    let mut saw_other_kind = false;
    for line in lines {
        if !line.starts_with(CONFLICT_PREFIX) {
            continue;
        }
        saw_marker = true;
        if let Some((_, path)) = line.split_once(CONTENT_MARKER) {
            push_unique(&mut files, unquote(path.trim_end()));
        } else {
            saw_other_kind = true;
        }
    }

    if saw_marker && saw_other_kind {
        for path in listed {
            push_unique(&mut files, unquote(path));
        }
    }
    files
}

/// Undo git's C-style quoting of unusual paths (`"dir/sp\303\251cial.txt"`).
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_owned();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.bytes().peekable();
    while let Some(b) = chars.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match chars.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'"') => bytes.push(b'"'),
            Some(b'\\') => bytes.push(b'\\'),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(b'?'));
            }
            Some(other) => {
                bytes.push(b'\\');
                bytes.push(other);
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn push_unique(files: &mut Vec<String>, path: String) {
    if !files.contains(&path) {
        files.push(path);
    }
}

fn unordered_pairs(names: &[BranchName]) -> Vec<(BranchName, BranchName)> {
    let mut pairs = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            pairs.push((a.clone(), b.clone()));
        }
    }
    pairs
}
