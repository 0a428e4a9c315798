//! Runtime configuration
//!
//! Read from `~/.config/ledgerdiff/config.json` unless a path is given.
//! Missing files fall back to defaults; missing fields too.

use crate::model::MAX_TREE_DEPTH;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deepest node a diff or fill will visit before giving up
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: MAX_TREE_DEPTH,
        }
    }
}

impl Config {
    /// Default config location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ledgerdiff").join("config.json"))
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!("No config file at {}", p.display())));
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;

        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
