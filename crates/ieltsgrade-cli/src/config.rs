//! Grader configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level ieltsgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Max attempts graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format used when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./ieltsgrade-results")
}
fn default_format() -> String {
    "json".to_string()
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `ieltsgrade.toml` in the current directory
/// 2. `~/.config/ieltsgrade/config.toml`
///
/// Environment variable override: `IELTSGRADE_PARALLELISM`.
pub fn load_config_from(path: Option<&Path>) -> Result<GraderConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ieltsgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GraderConfig::default(),
    };

    if let Ok(value) = std::env::var("IELTSGRADE_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("invalid IELTSGRADE_PARALLELISM: '{value}'"))?;
    }

    Ok(config)
}

fn parse_config(content: &str) -> Result<GraderConfig> {
    Ok(toml::from_str::<GraderConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ieltsgrade"))
}
