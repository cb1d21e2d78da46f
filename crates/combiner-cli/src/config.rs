//! `combiner.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolPaths,
    pub resources: ResourcePaths,
}

/// External programs, looked up on `PATH` unless given with a directory
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub dumpsxiso: PathBuf,
    pub mkpsxiso: PathBuf,
    pub gtvoltool: PathBuf,
    pub ovl_tool: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            dumpsxiso: PathBuf::from("dumpsxiso"),
            mkpsxiso: PathBuf::from("mkpsxiso"),
            gtvoltool: PathBuf::from("GTVolTool"),
            ovl_tool: PathBuf::from("gt2-ovl"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    /// Per-locale menu definition records
    pub menu_entries: PathBuf,
    /// Replacement files for the VOL archive, with `file.hashes`
    pub vol_replacements: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            menu_entries: PathBuf::from("resources/menu_entries"),
            vol_replacements: PathBuf::from("resources/vol_replacements"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
