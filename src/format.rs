//! Output format selection for `grove` commands.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// JSON, pretty-printed, for scripts and agents.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => bail!("invalid format '{s}'. Use: text or json"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    /// Serialize `data` as pretty JSON.
    ///
    /// # Errors
    /// Fails if `data` cannot be represented as JSON.
    pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
        serde_json::to_string_pretty(data)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}"))
    }
}
