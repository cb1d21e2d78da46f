//! External tool invocations

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::config::ToolPaths;

/// Name of the disc descriptor written next to each unpacked disc
pub const DESCRIPTOR_NAME: &str = "files.xml";

fn run<I, S>(program: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!("Running {:?}", command);

    let status = command
        .status()
        .with_context(|| format!("Failed to start {}", program.display()))?;
    if !status.success() {
        bail!("{} failed with {}", program.display(), status);
    }
    Ok(())
}

pub struct Tools<'a> {
    paths: &'a ToolPaths,
}

impl<'a> Tools<'a> {
    pub fn new(paths: &'a ToolPaths) -> Self {
        Self { paths }
    }

    /// Extract `disc` into `dest`, writing its descriptor alongside
    pub fn unpack_disc(&self, disc: &Path, dest: &Path) -> Result<()> {
        let descriptor = dest.join(DESCRIPTOR_NAME);
        run(
            &self.paths.dumpsxiso,
            [
                disc.as_os_str(),
                OsStr::new("-x"),
                dest.as_os_str(),
                OsStr::new("-s"),
                descriptor.as_os_str(),
            ],
        )
    }

    pub fn pack_disc(&self, descriptor: &Path) -> Result<()> {
        run(&self.paths.mkpsxiso, [descriptor.as_os_str(), OsStr::new("-y")])
    }

    pub fn unpack_vol(&self, vol: &Path, dest: &Path) -> Result<()> {
        run(
            &self.paths.gtvoltool,
            [OsStr::new("-e2"), vol.as_os_str(), dest.as_os_str()],
        )
    }

    pub fn pack_vol(&self, source: &Path, vol: &Path) -> Result<()> {
        run(
            &self.paths.gtvoltool,
            [OsStr::new("-r2"), source.as_os_str(), vol.as_os_str()],
        )
    }

    pub fn unpack_ovl(&self, ovl: &Path, dest: &Path) -> Result<()> {
        run(
            &self.paths.ovl_tool,
            [OsStr::new("unpack"), ovl.as_os_str(), dest.as_os_str()],
        )
    }

    pub fn pack_ovl(&self, source: &Path, ovl: &Path) -> Result<()> {
        run(
            &self.paths.ovl_tool,
            [OsStr::new("pack"), source.as_os_str(), ovl.as_os_str()],
        )
    }
}
