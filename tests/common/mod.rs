//! Shared helpers for grove integration tests.
//!
//! Every test builds its own repository in a temp directory, with branch
//! worktrees in a second temp directory beside it. Nothing touches the real
//! repository.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use grove_git::CliGit;
use tempfile::TempDir;

/// Lines of `shared.go` on `main`; branches edit individual lines of it.
pub const SHARED_LINES: usize = 10;

/// A repository on `main` with one initial commit.
pub struct TestRepo {
    root: TempDir,
    trees: TempDir,
}

impl TestRepo {
    /// `main` holds `README.md` and a ten-line `shared.go`.
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create repo temp dir");
        let trees = TempDir::new().expect("failed to create worktree temp dir");
        let repo = Self { root, trees };

        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.email", "test@test.com"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.write("README.md", "# test repo\n");
        repo.write("shared.go", &shared_go(&[]));
        repo.commit_all("initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn runner(&self) -> CliGit {
        CliGit::new(self.path())
    }

    /// Run git in the main worktree, asserting success; returns stdout.
    pub fn git(&self, args: &[&str]) -> String {
        run_git(self.path(), args)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        write_file(self.path(), rel, contents);
    }

    pub fn commit_all(&self, message: &str) {
        commit_all(self.path(), message);
    }

    /// Create `branch` off `main` in its own worktree, write `files` there,
    /// and commit them. Returns the worktree path.
    pub fn branch_with(&self, branch: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.trees.path().join(branch.replace('/', "-"));
        let dir_str = dir.to_string_lossy().into_owned();
        self.git(&["worktree", "add", "-b", branch, &dir_str, "main"]);
        for (rel, contents) in files {
            write_file(&dir, rel, contents);
        }
        commit_all(&dir, &format!("work on {branch}"));
        dir
    }

    /// Like [`branch_with`](Self::branch_with) but without a worktree.
    pub fn plain_branch_with(&self, branch: &str, files: &[(&str, &str)]) {
        self.git(&["checkout", "-q", "-b", branch, "main"]);
        for (rel, contents) in files {
            self.write(rel, contents);
        }
        self.commit_all(&format!("work on {branch}"));
        self.git(&["checkout", "-q", "main"]);
    }
}

/// `shared.go` with the given `(line index, text)` replacements.
pub fn shared_go(edits: &[(usize, &str)]) -> String {
    (0..SHARED_LINES)
        .map(|i| {
            let line = edits
                .iter()
                .find(|(at, _)| *at == i)
                .map_or_else(|| format!("line {i}"), |(_, text)| (*text).to_owned());
            line + "\n"
        })
        .collect()
}

pub fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn commit_all(dir: &Path, message: &str) {
    run_git(dir, &["add", "-A"]);
    run_git(dir, &["commit", "-q", "-m", message]);
}

pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// `git merge-tree --write-tree` arrived in git 2.38.
pub fn git_supports_merge_tree_write() -> bool {
    let out = Command::new("git")
        .args(["merge-tree", "-h"])
        .output()
        .expect("failed to run git");
    let help = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    help.contains("--write-tree")
}

// ---------------------------------------------------------------------------
// Binary helpers
// ---------------------------------------------------------------------------

/// Run the grove binary in `dir`, with logging quiet and env-independent.
pub fn grove_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grove"))
        .args(args)
        .current_dir(dir)
        .env_remove("GROVE_LOG")
        .env_remove("GROVE_LOG_FORMAT")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .output()
        .expect("failed to run grove")
}

/// Run grove and assert success; returns stdout.
pub fn grove_ok(dir: &Path, args: &[&str]) -> String {
    let out = grove_in(dir, args);
    assert!(
        out.status.success(),
        "grove {} failed\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Run grove and assert failure; returns stderr.
pub fn grove_fails(dir: &Path, args: &[&str]) -> String {
    let out = grove_in(dir, args);
    assert!(
        !out.status.success(),
        "grove {} should have failed\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout)
    );
    String::from_utf8_lossy(&out.stderr).into_owned()
}
