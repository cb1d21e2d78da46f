//! Arcade overlay
//!
//! The arcade overlay carries its text table as an embedded gzip member. The
//! table is decompressed, its disc swap strings rewritten, and the member put
//! back in place or appended when it no longer fits.

use crate::error::Result;
use crate::gzip::replace_embedded;
use crate::patches::text::rewrite_disc_swap_text;
use crate::session::{PatchContext, PatchStep, Requirement};

/// Name stored in the member header when the original has none
pub const TEXT_TABLE_NAME: &str = "data-arcade.txd";

pub struct ArcadeTextStep;

impl PatchStep for ArcadeTextStep {
    fn name(&self) -> &str {
        "arcade text table"
    }

    fn requirement(&self) -> Requirement {
        Requirement::Optional
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        // lui $a0 / addiu $a0 pair loading the member address
        let site = ctx.locate("?? ?? 04 3C ?? ?? 84 24", 0)?;
        let (image, append) = ctx.parts_mut();
        replace_embedded(image, append, site, site + 4, Some(TEXT_TABLE_NAME), |payload| {
            rewrite_disc_swap_text(payload)?;
            Ok(())
        })?;
        Ok(())
    }
}

pub fn steps() -> Vec<Box<dyn PatchStep>> {
    vec![Box::new(ArcadeTextStep)]
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;
    use crate::gzip::compress;
    use crate::image::Image;
    use crate::session::FailurePolicy;

    const BASE: u32 = 0x8001_0000;
    const MEMBER: u32 = BASE + 0x20;

    fn text_table() -> Vec<u8> {
        let mut table = vec![0x11u8; 16];
        let mut field = b"Obtain Licences in Disk 2 to Access All Courses".to_vec();
        field.resize(59, 0);
        table.extend(field);
        table.extend([0x22u8; 16]);
        table
    }

    fn overlay_with(member: &[u8], slack: usize) -> Image {
        let mut data = vec![0u8; 0x20];
        data[0..8].copy_from_slice(&[0x00, 0x00, 0x04, 0x3C, 0x00, 0x00, 0x84, 0x24]);
        data.extend_from_slice(member);
        data.resize(data.len() + slack, 0xCC);
        let mut image = Image::headless(data, BASE);
        image.write_indirect(BASE, BASE + 4, MEMBER).unwrap();
        image
    }

    fn decompress(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rewritten_table_is_readable() {
        let member = compress(&text_table(), Some(TEXT_TABLE_NAME)).unwrap();
        let mut ctx = PatchContext::new("gt2_03.exe", overlay_with(&member, 8));
        let outcome = ctx.run_step(&ArcadeTextStep, FailurePolicy::strict()).unwrap();
        assert!(!outcome.is_warning());

        let address = ctx.image().read_indirect(BASE, BASE + 4).unwrap();
        let bytes = if address == MEMBER {
            ctx.image().as_bytes()[0x20..].to_vec()
        } else {
            ctx.append().as_bytes()[(address - ctx.append().start_address()) as usize..].to_vec()
        };
        let table = decompress(&bytes);
        let expected = b"Obtain Licenses in Simulation Mode to Access All Courses";
        assert_eq!(&table[16..16 + expected.len()], expected);
        assert_eq!(table.len(), text_table().len());
    }

    #[test]
    fn test_missing_member_is_a_warning() {
        let mut ctx = PatchContext::new("gt2_03.exe", overlay_with(&[0u8; 32], 0));
        let before = ctx.image().as_bytes().to_vec();
        let outcome = ctx.run_step(&ArcadeTextStep, FailurePolicy::lenient()).unwrap();
        assert!(outcome.is_warning());
        assert_eq!(ctx.image().as_bytes(), &before[..]);
    }
}
