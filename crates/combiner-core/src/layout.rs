//! Layout constants for the game executables
//!
//! This module centralizes the load addresses, record sizes and instruction
//! encodings the patch steps rely on. Constants are organized by structure type.

/// PS-X EXE container constants
pub mod exe {
    /// Magic at the start of a boot executable
    pub const MAGIC: &[u8; 8] = b"PS-X EXE";
    /// Bytes of header before the text section
    pub const HEADER_SIZE: usize = 0x800;

    pub const INITIAL_PC: usize = 0x10;
    pub const TEXT_ADDRESS: usize = 0x18;
    pub const TEXT_SIZE: usize = 0x1C;
}

/// Overlay executables are raw text loaded at a fixed address
pub mod overlay {
    pub const BASE_ADDRESS: u32 = 0x8001_0000;

    /// Main menu overlay
    pub const MAIN_MENU: &str = "gt2_02.exe";
    /// Race overlay
    pub const RACE: &str = "gt2_01.exe";
    /// Arcade mode overlay
    pub const ARCADE: &str = "gt2_03.exe";
}

/// Main menu data structures
pub mod menu {
    /// Word size (4 bytes / 32-bit pointer or instruction)
    pub const WORD: u32 = 4;

    /// Number of menu actions once the combined-disc entry is added
    pub const ACTION_COUNT: u16 = 8;
    /// Jump table slot for the new action
    pub const NEW_ACTION_SLOT: u32 = 7;

    // Fields read from action 0 when cloning it
    pub const ACTION_ATTR_HI: u32 = WORD;
    pub const ACTION_ATTR_LO: u32 = WORD * 2;
    pub const ACTION_JAL: u32 = WORD * 6;
    pub const ACTION_J: u32 = WORD * 8;

    /// One menu item definition
    pub const ITEM_SIZE: usize = 12;
    /// Items per language after expansion
    pub const ITEMS_PER_LANGUAGE: usize = 7;
    /// Size of one language's definitions block
    pub const LANGUAGE_BLOCK_SIZE: usize = ITEM_SIZE * ITEMS_PER_LANGUAGE;
    /// Size of the data transfer box definition stored before the first block
    pub const MISC_BLOCK_SIZE: usize = ITEM_SIZE;

    /// Size of the relocated menu definition header
    pub const UNKNOWN_DEFS_SIZE: usize = 4;
    /// Bytes the texture array moves forward
    pub const TEXTURE_SHIFT: u32 = 2;

    pub const ACTION_ORDER: [i16; 9] = [-1, 7, 0, 1, 2, 3, 4, 5, -1];
    pub const TEXTURE_ORDER: [i16; 9] = [0, 0, 1, 2, 3, 4, 5, 6, 0];

    /// Value for the menu entry count
    pub const ENTRY_COUNT: u16 = 9;
    /// Upper clamp for the menu cursor
    pub const CURSOR_CLAMP: u16 = 7;
}

/// MIPS instruction words assembled by the patch steps
pub mod mips {
    /// li $a0, 2
    pub const LI_A0_2: u32 = 0x2404_0002;
    /// li $v1, 1
    pub const LI_V1_1: u32 = 0x2403_0001;
    /// sb $v1, 1($v0)
    pub const SB_V1_1_V0: u32 = 0xA043_0001;
    /// sb $v1, 2($v0)
    pub const SB_V1_2_V0: u32 = 0xA043_0002;
    /// li $v0, 1
    pub const LI_V0_1: u32 = 0x2402_0001;
    /// Branch operands of beq $v1, $v0
    pub const BEQ_V1_V0_OPERANDS: u16 = 0x1062;
    pub const NOP: u32 = 0;
}

/// Immediate used to re-enable movie playback
pub const MOVIE_ENABLED: u16 = 5;

/// Alignment required for appended code and pointer targets
pub const APPEND_ALIGNMENT: u32 = 4;
