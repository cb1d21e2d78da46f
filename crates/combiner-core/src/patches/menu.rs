//! Main menu overlay
//!
//! The Simulation disc's main menu has six entries per language. The combined
//! disc adds a seventh that launches Arcade mode, which means:
//!
//! 1. a new menu action, cloned from action 0 and appended to the overlay
//! 2. a new action order and texture order
//! 3. per-language item definitions grown from 6 to 7 entries
//! 4. the entry count and cursor clamp raised to match
//!
//! Steps run in this order. Later steps read pointers earlier ones wrote.

use strum::IntoEnumIterator;
use tracing::debug;

use crate::error::Result;
use crate::layout::{APPEND_ALIGNMENT, menu, mips};
use crate::patches::ImmediatePatch;
use crate::resources::{Locale, MISC_RECORD, RecordSource};
use crate::session::{PatchContext, PatchStep, Requirement};

/// Language blocks that fit where the original 7 x 6 table was
const IN_PLACE_LANGUAGES: usize = 6;

/// Adds the Arcade mode action to the menu jump table
pub struct MenuActionStep;

impl PatchStep for MenuActionStep {
    fn name(&self) -> &str {
        "menu action jump table"
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        // sltiu $v0, $v1, 7 - the bound check in front of the jump table
        let bound = ctx.locate("00 00 00 00 07 00 62 2C", 4)?;

        let image = ctx.image();
        let table = image.read_indirect(bound + 8, bound + 12)?;
        let action0 = image.read_address(table)?;
        let field = |delta| image.offset_address(action0, delta);
        let attr_hi = image.read_u32(field(menu::ACTION_ATTR_HI)?)?;
        let attr_lo = image.read_u32(field(menu::ACTION_ATTR_LO)?)?;
        let jal = image.read_u32(field(menu::ACTION_JAL)?)?;
        let jump = image.read_u32(field(menu::ACTION_J)?)?;
        let slot = image.offset_address(table, menu::NEW_ACTION_SLOT * menu::WORD)?;
        image.bytes_at(slot, 4)?;
        debug!(
            "Jump table 0x{:08X}, action 0 at 0x{:08X}, slot 0x{:08X}",
            table, action0, slot
        );

        let record: Vec<u8> = [
            mips::LI_A0_2,
            attr_hi,
            attr_lo,
            mips::LI_V1_1,
            mips::SB_V1_1_V0,
            jal,
            mips::SB_V1_2_V0,
            jump,
            mips::NOP,
        ]
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect();

        let (image, append) = ctx.parts_mut();
        image.write_u16(bound, menu::ACTION_COUNT)?;
        let action = append.append_aligned(&record, APPEND_ALIGNMENT);
        image.write_address(slot, action)?;
        debug!("New menu action at 0x{:08X}", action);
        Ok(())
    }
}

/// Rewrites the table mapping menu positions to actions
pub struct ActionOrderStep;

impl PatchStep for ActionOrderStep {
    fn name(&self) -> &str {
        "menu action order"
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        let site = ctx.locate("?? ?? 02 3C ?? ?? 42 24 40 18 11 00 21 18 62 00", 0)?;
        let table = ctx.image().read_indirect(site, site + 4)?;
        ctx.image_mut().write_i16_table(table, &menu::ACTION_ORDER)
    }
}

/// Grows the per-language item definitions from six entries to seven
pub struct MenuDefinitionsStep<'r> {
    pub records: &'r dyn RecordSource,
}

impl PatchStep for MenuDefinitionsStep<'_> {
    fn name(&self) -> &str {
        "menu definitions"
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        let site = ctx.locate(
            "21 20 00 02 ?? ?? 05 3C ?? ?? ?? ?? ?? ?? A5 24 ?? ?? 04 3C ?? ?? 84 24 80 28 12 00",
            0,
        )?;

        let image = ctx.image();
        let defs = image.read_indirect(site + 4, site + 12)?;
        let defs_bytes = image.bytes_at(defs, menu::UNKNOWN_DEFS_SIZE)?.to_vec();
        let textures = image.read_indirect(site + 28, site + 32)?;
        let textures = image.offset_address(textures, menu::TEXTURE_SHIFT)?;
        image.bytes_at(textures, menu::TEXTURE_ORDER.len() * 2)?;

        let array = image.read_indirect(site + 16, site + 20)?;
        let language_count = Locale::iter().count();
        image.bytes_at(array, language_count * menu::WORD as usize)?;
        let first_block = image.read_address(array)?;
        let misc_at = first_block.wrapping_sub(menu::MISC_BLOCK_SIZE as u32);
        image.bytes_at(
            misc_at,
            menu::MISC_BLOCK_SIZE + IN_PLACE_LANGUAGES * menu::LANGUAGE_BLOCK_SIZE,
        )?;

        let misc = self.records.read_sized(MISC_RECORD, menu::MISC_BLOCK_SIZE)?;
        let blocks = Locale::iter()
            .map(|locale| self.records.read_sized(locale.key(), menu::LANGUAGE_BLOCK_SIZE))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Definitions array 0x{:08X}, first block 0x{:08X}, textures 0x{:08X}",
            array, first_block, textures
        );

        let (image, append) = ctx.parts_mut();

        let moved = append.append_aligned(&defs_bytes, APPEND_ALIGNMENT);
        image.write_indirect(site + 4, site + 12, moved)?;

        image.write_indirect(site + 28, site + 32, textures)?;
        image.write_i16_table(textures, &menu::TEXTURE_ORDER)?;

        image.write_bytes(misc_at, &misc)?;
        let mut slot = array;
        for (index, block) in blocks.iter().enumerate() {
            let address = if index < IN_PLACE_LANGUAGES {
                let address = first_block + (index * menu::LANGUAGE_BLOCK_SIZE) as u32;
                image.write_bytes(address, block)?;
                address
            } else {
                append.append_aligned(block, APPEND_ALIGNMENT)
            };
            image.write_address(slot, address)?;
            slot += menu::WORD;
        }
        Ok(())
    }
}

/// Raises the stored menu entry count
pub struct EntryCountStep;

impl PatchStep for EntryCountStep {
    fn name(&self) -> &str {
        "menu entry count"
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
        let site = ctx.locate("?? ?? 03 3C ?? ?? 10 3C ?? ?? 10 26 21 20 00 02", 4)?;
        let count = ctx.image().read_indirect(site, site + 4)?;
        ctx.image_mut().write_u16(count, menu::ENTRY_COUNT)
    }
}

/// Every main menu step, in the order they must run
pub fn steps(records: &dyn RecordSource) -> Vec<Box<dyn PatchStep + '_>> {
    vec![
        Box::new(MenuActionStep),
        Box::new(ActionOrderStep),
        Box::new(MenuDefinitionsStep { records }),
        Box::new(EntryCountStep),
        Box::new(ImmediatePatch {
            name: "menu cursor clamp",
            pattern: "06 00 06 24 FD FF 02 24",
            result_offset: 0,
            value: menu::CURSOR_CLAMP,
            requirement: Requirement::Mandatory,
        }),
    ]
}
