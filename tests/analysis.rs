//! End-to-end tests of the analysis engine against real git repositories.
//!
//! Coverage:
//! - overlap severity, isolated branches, and plan order on real diffs
//! - three-dot semantics: base-branch changes after the fork are ignored
//! - collection failure for a missing branch or unrelated history
//! - dry merge: incompatible vs compatible edits to one file
//! - worktree enumeration feeding the engine

mod common;

use common::{TestRepo, git_supports_merge_tree_write, shared_go};
use grove::analysis::{
    self, AnalysisError, CheckOptions, PlanOutcome, Severity, collect_diffs, detect_overlaps,
    plan_merge_order, simulate_all,
};
use grove::worktrees::{candidate_branches, list_worktrees};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Overlaps and plans
// ---------------------------------------------------------------------------

#[test]
fn two_branches_share_one_file() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("shared.go", &shared_go(&[(0, "a")])), ("a.go", "a\n")]);
    repo.branch_with("b", &[("shared.go", &shared_go(&[(9, "b")])), ("b.go", "b\n")]);

    let git = repo.runner();
    let diffs = collect_diffs(&git, "main", &names(&["a", "b"]), 8).unwrap();
    let result = detect_overlaps(&diffs);

    assert_eq!(result.total_branches, 2);
    assert_eq!(result.overlaps.len(), 1);
    assert_eq!(result.overlaps[0].file, "shared.go");
    assert_eq!(result.overlaps[0].branches, names(&["a", "b"]));
    assert_eq!(result.overlaps[0].severity, Severity::Medium);
}

#[test]
fn three_branches_share_one_file_is_high() {
    let repo = TestRepo::new();
    for (i, b) in ["a", "b", "c"].iter().enumerate() {
        repo.branch_with(b, &[("shared.go", &shared_go(&[(i * 3, *b)]))]);
    }

    let diffs = collect_diffs(&repo.runner(), "main", &names(&["a", "b", "c"]), 2).unwrap();
    let result = detect_overlaps(&diffs);

    assert_eq!(result.overlaps.len(), 1);
    assert_eq!(result.overlaps[0].branches, names(&["a", "b", "c"]));
    assert_eq!(result.overlaps[0].severity, Severity::High);
}

#[test]
fn disjoint_branches_are_all_isolated() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("x.go", "x\n")]);
    repo.branch_with("b", &[("y.go", "y\n")]);
    repo.branch_with("c", &[("z.go", "z\n")]);
    let branches = names(&["a", "b", "c"]);

    let outcome = analysis::plan_order(&repo.runner(), "main", &branches, 8).unwrap();
    match outcome {
        PlanOutcome::Planned { plan, isolated } => {
            assert!(plan.steps.is_empty());
            assert_eq!(isolated, branches);
        }
        other => panic!("expected a plan, got {other:?}"),
    }
}

#[test]
fn contested_pair_plus_isolated_branch() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("shared.go", &shared_go(&[(0, "a")])), ("a.go", "a\n")]);
    repo.branch_with("b", &[("shared.go", &shared_go(&[(9, "b")])), ("b.go", "b\n")]);
    repo.branch_with("c", &[("c.go", "c\n")]);

    let outcome =
        analysis::plan_order(&repo.runner(), "main", &names(&["a", "b", "c"]), 8).unwrap();
    let PlanOutcome::Planned { plan, isolated } = outcome else {
        panic!("expected a plan");
    };
    assert_eq!(isolated, names(&["c"]));
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].branch, "a");
    assert_eq!(plan.steps[0].overlap_count, 1);
    assert_eq!(plan.steps[1].branch, "b");
    assert_eq!(plan.steps[1].overlap_count, 0);
}

#[test]
fn incompatible_edits_conflict() {
    if !git_supports_merge_tree_write() {
        eprintln!("skipping: git merge-tree --write-tree not available");
        return;
    }
    let repo = TestRepo::new();
    repo.branch_with("a", &[("shared.go", &shared_go(&[(4, "from a")]))]);
    repo.branch_with("b", &[("shared.go", &shared_go(&[(4, "from b")]))]);

    let results = simulate_all(&repo.runner(), &names(&["a", "b"]), 8).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].has_conflicts);
    assert_eq!(results[0].conflict_files, names(&["shared.go"]));
}

#[test]
fn compatible_edits_overlap_but_merge_clean() {
    if !git_supports_merge_tree_write() {
        eprintln!("skipping: git merge-tree --write-tree not available");
        return;
    }
    let repo = TestRepo::new();
    repo.branch_with("a", &[("shared.go", &shared_go(&[(0, "from a")]))]);
    repo.branch_with("b", &[("shared.go", &shared_go(&[(9, "from b")]))]);
    let branches = names(&["a", "b"]);

    let report = analysis::check(
        &repo.runner(),
        "main",
        &branches,
        CheckOptions {
            jobs: 8,
            dry_merge: true,
        },
    )
    .unwrap();

    assert_eq!(report.check.overlaps.len(), 1);
    assert_eq!(report.check.overlaps[0].file, "shared.go");
    let dry = report.dry_merges.expect("dry merges requested");
    assert_eq!(dry.len(), 1);
    assert!(!dry[0].has_conflicts);
    assert!(dry[0].conflict_files.is_empty());
    assert!(report.dry_merge_error.is_none());
}

// ---------------------------------------------------------------------------
// Diff collection
// ---------------------------------------------------------------------------

#[test]
fn base_changes_after_fork_are_not_attributed_to_branch() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("a.go", "a\n")]);
    repo.write("README.md", "# moved on\n");
    repo.write("base-only.txt", "later\n");
    repo.commit_all("main moves on");

    let diffs = collect_diffs(&repo.runner(), "main", &names(&["a"]), 8).unwrap();
    assert_eq!(diffs[0].files, names(&["a.go"]));
}

#[test]
fn diffs_keep_input_order_under_parallelism() {
    let repo = TestRepo::new();
    let branches: Vec<String> = (0..12).map(|i| format!("feature/{i:02}")).collect();
    for b in &branches {
        let file = format!("{}.txt", b.replace('/', "_"));
        repo.plain_branch_with(b, &[(file.as_str(), "x\n")]);
    }

    let diffs = collect_diffs(&repo.runner(), "main", &branches, 4).unwrap();
    let order: Vec<&str> = diffs.iter().map(|d| d.branch.as_str()).collect();
    assert_eq!(order, branches.iter().map(String::as_str).collect::<Vec<_>>());
    for d in &diffs {
        assert_eq!(d.files, vec![format!("{}.txt", d.branch.replace('/', "_"))]);
    }
}

#[test]
fn missing_branch_fails_whole_collection() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("a.go", "a\n")]);

    let err = collect_diffs(&repo.runner(), "main", &names(&["a", "ghost"]), 8).unwrap_err();
    match err {
        AnalysisError::CollectionFailed { branch, .. } => assert_eq!(branch, "ghost"),
        other => panic!("expected CollectionFailed, got {other}"),
    }
}

#[test]
fn unrelated_history_has_no_merge_base() {
    let repo = TestRepo::new();
    repo.git(&["checkout", "-q", "--orphan", "orphan"]);
    repo.git(&["rm", "-rqf", "."]);
    repo.write("orphan.txt", "alone\n");
    repo.git(&["add", "orphan.txt"]);
    repo.git(&["commit", "-q", "-m", "orphan root"]);
    repo.git(&["checkout", "-q", "main"]);

    let err = collect_diffs(&repo.runner(), "main", &names(&["orphan"]), 8).unwrap_err();
    assert!(matches!(err, AnalysisError::CollectionFailed { ref branch, .. } if branch == "orphan"));
}

#[test]
fn option_like_branch_name_never_reaches_git() {
    let repo = TestRepo::new();
    let err = collect_diffs(&repo.runner(), "main", &names(&["--output=x"]), 8).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidBranch { .. }));
    assert!(!repo.path().join("x").exists());
}

// ---------------------------------------------------------------------------
// Planning and enumeration
// ---------------------------------------------------------------------------

#[test]
fn fully_qualified_branch_names_are_planned_like_short_ones() {
    let repo = TestRepo::new();
    repo.branch_with("a", &[("shared.go", &shared_go(&[(0, "a")]))]);
    repo.branch_with("b", &[("shared.go", &shared_go(&[(9, "b")]))]);

    let outcome = analysis::plan_order(
        &repo.runner(),
        "main",
        &names(&["refs/heads/a", "refs/heads/b"]),
        2,
    )
    .unwrap();
    let PlanOutcome::Planned { plan, isolated } = outcome else {
        panic!("expected a plan");
    };
    assert!(isolated.is_empty());
    assert_eq!(plan.branches().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(plan.steps[0].overlap_count, 1);
}

#[test]
fn chain_of_overlaps_is_planned_least_contested_first() {
    let repo = TestRepo::new();
    // a and b share p.go, b and c share q.go.
    repo.branch_with("b", &[("p.go", "b\n"), ("q.go", "b\n")]);
    repo.branch_with("a", &[("p.go", "a\n")]);
    repo.branch_with("c", &[("q.go", "c\n")]);

    let branches = names(&["b", "a", "c"]);
    let diffs = collect_diffs(&repo.runner(), "main", &branches, 8).unwrap();
    let plan = plan_merge_order(&detect_overlaps(&diffs), &branches);
    let order: Vec<&str> = plan.branches().collect();
    assert_eq!(order, vec!["a", "b", "c"]);
    assert_eq!(plan.steps.last().map(|s| s.overlap_count), Some(0));
}

#[test]
fn worktree_branches_become_candidates() {
    let repo = TestRepo::new();
    repo.branch_with("feature-a", &[("a.go", "a\n")]);
    repo.branch_with("feature-b", &[("b.go", "b\n")]);
    repo.plain_branch_with("no-worktree", &[("n.go", "n\n")]);
    let scratch = tempfile::TempDir::new().unwrap();
    let detached = scratch.path().join("detached");
    let detached_str = detached.to_string_lossy().into_owned();
    repo.git(&["worktree", "add", "--detach", &detached_str, "main"]);

    let entries = list_worktrees(&repo.runner()).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().any(|e| e.detached));

    let mut candidates = candidate_branches(&entries, "main");
    candidates.sort();
    assert_eq!(candidates, names(&["feature-a", "feature-b"]));

    repo.git(&["worktree", "remove", "--force", &detached_str]);
}
