//! Pack command

use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use crate::config::Config;
use crate::discs::WorkDir;
use crate::tools::{DESCRIPTOR_NAME, Tools};

/// Rebuild GT2.OVL and GT2.VOL inside the Simulation disc, then the disc image
pub fn run(config: &Config, work: &Path, descriptor: Option<&Path>) -> Result<()> {
    let tools = Tools::new(&config.tools);
    let work = WorkDir::new(work);
    let discs = work.discs()?;

    let descriptor = descriptor
        .map(Path::to_path_buf)
        .unwrap_or_else(|| discs.simulation.join(DESCRIPTOR_NAME));
    if !descriptor.is_file() {
        bail!("Disc descriptor {} not found", descriptor.display());
    }

    info!("Packing GT2.OVL...");
    tools.pack_ovl(&work.ovl_dir(), &discs.simulation.join("GT2.OVL"))?;
    info!("Packing GT2.VOL...");
    tools.pack_vol(&work.vol_dir(), &discs.simulation.join("GT2.VOL"))?;
    info!("Packing the combined disc...");
    tools.pack_disc(&descriptor)?;

    println!("Disc built from {}", descriptor.display());
    Ok(())
}
