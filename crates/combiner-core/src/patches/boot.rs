//! Boot executable
//!
//! The Simulation disc boots straight into the menu. Raising the argument of
//! the startup movie call from 1 to 5 brings back the intro movie that only
//! the Arcade disc used to play.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layout::MOVIE_ENABLED;
use crate::patches::ImmediatePatch;
use crate::session::{PatchStep, Requirement};

/// Name of the boot executable from `SYSTEM.CNF` contents.
///
/// `BOOT = cdrom:\SCUS_944.88;1` yields `SCUS_944.88`.
pub fn boot_executable_name(system_cnf: &str) -> Result<String> {
    let entries: HashMap<&str, &str> = system_cnf
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    let boot = entries
        .get("BOOT")
        .ok_or_else(|| Error::SystemConfig("BOOT entry missing".to_string()))?;
    let path = boot.strip_prefix("cdrom:\\").unwrap_or(boot);
    let name = path.rsplit_once(';').map_or(path, |(name, _)| name);

    if name.is_empty() {
        return Err(Error::SystemConfig(format!("invalid BOOT entry '{}'", boot)));
    }
    Ok(name.to_string())
}

pub fn steps() -> Vec<Box<dyn PatchStep>> {
    vec![Box::new(ImmediatePatch {
        name: "intro movie",
        pattern: "00 00 00 00 ?? ?? ?? ?? 01 00 04 24 10 00 BF 8F",
        result_offset: 8,
        value: MOVIE_ENABLED,
        requirement: Requirement::Mandatory,
    })]
}
