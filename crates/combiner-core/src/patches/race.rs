//! Race overlay
//!
//! Restores the pre-race and replay movies the Simulation disc skips.

use tracing::debug;

use crate::error::Result;
use crate::layout::{MOVIE_ENABLED, mips};
use crate::patches::ImmediatePatch;
use crate::session::{PatchContext, PatchStep, Requirement};

/// Forces the movie availability check to take the playback branch
pub struct MovieCheckStep;

impl PatchStep for MovieCheckStep {
    fn name(&self) -> &str {
        "race movie check"
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        // nop, then beq $s3, ??
        let site = ctx.locate("00 00 00 00 ?? ?? 73 10", 0)?;
        ctx.image().bytes_at(site, 8)?;
        debug!("Movie check at 0x{:08X}", site);

        let image = ctx.image_mut();
        image.write_u32(site, mips::LI_V0_1)?;
        image.write_u16(site + 6, mips::BEQ_V1_V0_OPERANDS)
    }
}

pub fn steps() -> Vec<Box<dyn PatchStep>> {
    vec![
        Box::new(ImmediatePatch {
            name: "race movie id",
            pattern: "10 00 B0 AF 01 00 13 24",
            result_offset: 4,
            value: MOVIE_ENABLED,
            requirement: Requirement::Mandatory,
        }),
        Box::new(MovieCheckStep),
        Box::new(ImmediatePatch {
            name: "replay movie",
            pattern: "01 00 04 24 10 00 BF 8F",
            result_offset: 0,
            value: MOVIE_ENABLED,
            requirement: Requirement::Mandatory,
        }),
    ]
}
