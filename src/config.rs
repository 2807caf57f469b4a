//! Solver configuration from `ising.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::tree::{Spin, TreeError};

/// File looked up next to the input and in its parent directories
pub const CONFIG_FILE: &str = "ising.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid initial spin in configuration: {0}")]
    InvalidSpin(#[from] TreeError),
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    solver: Option<SolverSection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Deserialize, Default)]
struct SolverSection {
    initial_spin: Option<i64>,
    sort_links: Option<bool>,
    check_spin_count: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputSection {
    dir: Option<PathBuf>,
    suffix: Option<String>,
    order: Option<SpinOrder>,
}

/// Order of spins in the result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpinOrder {
    /// Depth-first walk order
    #[default]
    Walk,
    /// Ascending node index
    Index,
}

/// Effective settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Spin every node starts from
    pub initial_spin: Spin,
    pub sort_links: bool,
    pub check_spin_count: bool,
    /// Result directory; `None` writes next to the input
    pub output_dir: Option<PathBuf>,
    pub suffix: String,
    pub order: SpinOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_spin: Spin::Up,
            sort_links: true,
            check_spin_count: true,
            output_dir: None,
            suffix: "_OUT.txt".to_string(),
            order: SpinOrder::Walk,
        }
    }
}

impl Config {
    /// Load `path`, or fall back to the first `ising.toml` found from
    /// `start` upwards, or to the defaults
    pub fn load(path: Option<&Path>, start: &Path) -> Result<Self, ConfigError> {
        match path.map(Path::to_path_buf).or_else(|| Self::discover(start)) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new(CONFIG_FILE))
    }

    fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let defaults = Self::default();
        let solver = file.solver.unwrap_or_default();
        let output = file.output.unwrap_or_default();

        let initial_spin = match solver.initial_spin {
            Some(value) => Spin::try_from(value)?,
            None => defaults.initial_spin,
        };

        Ok(Self {
            initial_spin,
            sort_links: solver.sort_links.unwrap_or(defaults.sort_links),
            check_spin_count: solver.check_spin_count.unwrap_or(defaults.check_spin_count),
            output_dir: output.dir,
            suffix: output.suffix.unwrap_or(defaults.suffix),
            order: output.order.unwrap_or(defaults.order),
        })
    }

    fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
