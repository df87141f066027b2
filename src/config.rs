//! Repository configuration (`.grove.toml`).
//!
//! Lives at the repository top level. Missing file → all defaults (no error).
//! Command-line flags override anything set here.
//!
//! ```toml
//! [repo]
//! branch = "main"
//!
//! [analysis]
//! jobs = 8
//! dry_merge = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::pool::DEFAULT_JOBS;

/// File name looked up at the repository root.
pub const CONFIG_FILE: &str = ".grove.toml";

/// Upper bound accepted for `analysis.jobs`.
pub const MAX_JOBS: usize = 64;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level grove configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroveConfig {
    /// Repository-level settings.
    #[serde(default)]
    pub repo: RepoConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Repository-level settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Base branch. `None` means detect from `origin/HEAD`, else `"main"`.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Settings for the analysis engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Worker bound for diff collection and dry merges.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Run the dry-merge simulator in `grove check` without `--dry-merge`.
    #[serde(default)]
    pub dry_merge: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            dry_merge: false,
        }
    }
}

const fn default_jobs() -> usize {
    DEFAULT_JOBS
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a grove configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl GroveConfig {
    /// Load `.grove.toml` from the repository root `root`.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn load_from_root(root: &Path) -> Result<Self, ConfigError> {
        Self::load(&root.join(CONFIG_FILE))
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found), parse
    /// errors, or out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML, unknown fields, or a `jobs`
    /// value outside `1..=64`.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let jobs = self.analysis.jobs;
        if jobs == 0 || jobs > MAX_JOBS {
            return Err(ConfigError {
                path: None,
                message: format!("analysis.jobs must be between 1 and {MAX_JOBS}, got {jobs}"),
            });
        }
        if let Some(branch) = &self.repo.branch
            && let Err(e) = grove_git::BranchName::new(branch)
        {
            return Err(ConfigError {
                path: None,
                message: format!("repo.branch: {e}"),
            });
        }
        Ok(())
    }
}
