//! Work directory layout and disc identification

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Only the Arcade disc carries the movie stream file
const ARCADE_MARKER: &str = "STREAM.DAT";

/// Unpacked discs, identified by content rather than by argument order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscPair {
    pub arcade: PathBuf,
    pub simulation: PathBuf,
}

impl DiscPair {
    pub fn identify(first: &Path, second: &Path) -> Result<Self> {
        let first_arcade = first.join(ARCADE_MARKER).is_file();
        let second_arcade = second.join(ARCADE_MARKER).is_file();

        match (first_arcade, second_arcade) {
            (true, false) => Ok(Self {
                arcade: first.to_path_buf(),
                simulation: second.to_path_buf(),
            }),
            (false, true) => Ok(Self {
                arcade: second.to_path_buf(),
                simulation: first.to_path_buf(),
            }),
            (true, true) => bail!(
                "Both discs contain {}! Did you unpack correct Arcade and Simulation discs?",
                ARCADE_MARKER
            ),
            (false, false) => bail!(
                "Could not determine the disc types after unpacking! Did you unpack correct Arcade and Simulation discs?"
            ),
        }
    }
}

/// Paths inside a work directory
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn disc_dirs(&self) -> (PathBuf, PathBuf) {
        (self.root.join("disc1"), self.root.join("disc2"))
    }

    pub fn discs(&self) -> Result<DiscPair> {
        let (first, second) = self.disc_dirs();
        DiscPair::identify(&first, &second)
    }

    /// Extracted `GT2.VOL` of the Simulation disc
    pub fn vol_dir(&self) -> PathBuf {
        self.root.join("vol")
    }

    /// Extracted `GT2.OVL` of the Simulation disc
    pub fn ovl_dir(&self) -> PathBuf {
        self.root.join("ovl")
    }
}
