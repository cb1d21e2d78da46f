//! Unpack command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::discs::WorkDir;
use crate::tools::Tools;

/// Extract both discs, then the Simulation disc's VOL and OVL archives
pub fn run(config: &Config, arcade: &Path, simulation: &Path, work: &Path) -> Result<()> {
    let tools = Tools::new(&config.tools);
    let work = WorkDir::new(work);
    let (first, second) = work.disc_dirs();

    info!("Unpacking the Arcade Mode disc...");
    tools.unpack_disc(arcade, &first)?;
    info!("Unpacking the Simulation Mode disc...");
    tools.unpack_disc(simulation, &second)?;

    // Identify by content in case the discs were given the wrong way round
    let discs = work.discs()?;
    info!("Arcade disc: {}", discs.arcade.display());
    info!("Simulation disc: {}", discs.simulation.display());

    info!("Unpacking GT2.VOL from the Simulation Mode disc...");
    let vol_dir = work.vol_dir();
    fs::create_dir_all(&vol_dir)
        .with_context(|| format!("Failed to create {}", vol_dir.display()))?;
    tools.unpack_vol(&discs.simulation.join("GT2.VOL"), &vol_dir)?;

    info!("Unpacking GT2.OVL from the Simulation Mode disc...");
    let ovl_dir = work.ovl_dir();
    fs::create_dir_all(&ovl_dir)
        .with_context(|| format!("Failed to create {}", ovl_dir.display()))?;
    tools.unpack_ovl(&discs.simulation.join("GT2.OVL"), &ovl_dir)?;

    println!("Unpacked into {}", work.root().display());
    Ok(())
}
