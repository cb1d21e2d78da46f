//! Patch catalogue for the combined disc
//!
//! Each submodule covers one file taken from the Simulation disc and exposes
//! its steps in the order they must run.

pub mod arcade;
pub mod boot;
pub mod menu;
pub mod race;
pub mod text;

use tracing::debug;

use crate::error::Result;
use crate::session::{PatchContext, PatchStep, Requirement};

/// Overwrite one 16-bit immediate found through a pattern
#[derive(Debug, Clone)]
pub struct ImmediatePatch {
    pub name: &'static str,
    pub pattern: &'static str,
    pub result_offset: usize,
    pub value: u16,
    pub requirement: Requirement,
}

impl PatchStep for ImmediatePatch {
    fn name(&self) -> &str {
        self.name
    }

    fn requirement(&self) -> Requirement {
        self.requirement
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        let address = ctx.locate(self.pattern, self.result_offset)?;
        debug!("{}: 0x{:04X} at 0x{:08X}", self.name, self.value, address);
        ctx.image_mut().write_u16(address, self.value)
    }
}

/// Disc swap text rewrite over a whole text table file
///
/// Open the file as a headless image at base 0 so addresses equal offsets.
pub struct TextTableStep;

impl PatchStep for TextTableStep {
    fn name(&self) -> &str {
        "disc swap text"
    }

    fn requirement(&self) -> Requirement {
        Requirement::Optional
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        let mut buf = ctx.image().as_bytes().to_vec();
        if text::rewrite_disc_swap_text(&mut buf)? == 0 {
            debug!("No disc swap text in table, nothing to rewrite");
            return Ok(());
        }
        let start = ctx.image().to_virtual(0);
        ctx.image_mut().write_bytes(start, &buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::session::FailurePolicy;

    #[test]
    fn test_immediate_patch() {
        let data = vec![0xFF, 0x01, 0x00, 0x04, 0x24, 0x10, 0x00, 0xBF, 0x8F];
        let mut ctx = PatchContext::new("overlay", Image::headless(data, 0x8001_0000));
        let step = ImmediatePatch {
            name: "movie",
            pattern: "01 00 04 24 10 00 BF 8F",
            result_offset: 0,
            value: 5,
            requirement: Requirement::Mandatory,
        };
        ctx.run_step(&step, FailurePolicy::strict()).unwrap();
        assert_eq!(
            ctx.image().as_bytes(),
            &[0xFF, 0x05, 0x00, 0x04, 0x24, 0x10, 0x00, 0xBF, 0x8F]
        );
    }

    #[test]
    fn test_text_table_step() {
        let mut data = b"xx".to_vec();
        data.extend_from_slice(b"in the ARCADE MODE DISC");
        data.resize(2 + 29, 0);
        let mut ctx = PatchContext::new("data-race.txd", Image::headless(data, 0));

        let outcome = ctx.run_step(&TextTableStep, FailurePolicy::strict()).unwrap();
        assert!(!outcome.is_warning());
        assert_eq!(&ctx.image().as_bytes()[2..16], b"in ARCADE MODE");
        assert!(ctx.image().as_bytes()[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_text_table_without_matches_succeeds() {
        let mut ctx = PatchContext::new("data-race.txd", Image::headless(vec![0; 32], 0));
        let outcome = ctx.run_step(&TextTableStep, FailurePolicy::strict()).unwrap();
        assert!(!outcome.is_warning());
        assert_eq!(ctx.image().as_bytes(), &[0; 32]);
    }
}
