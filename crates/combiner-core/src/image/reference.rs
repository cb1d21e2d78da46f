//! Split hi/lo address pairs
//!
//! MIPS code builds a 32-bit address from two instructions: `lui` loads the
//! high half, and `addiu`/a load-store offset adds the sign-extended low half.
//! When bit 15 of the low half is set the addition subtracts 0x10000, so the
//! high half is stored one larger than the target's top 16 bits.

/// Combine the two 16-bit immediates into the address they produce
pub fn decode(hi: u16, lo: u16) -> u32 {
    ((hi as u32) << 16).wrapping_add(lo as i16 as i32 as u32)
}

/// Split `target` into the immediates that rebuild it
pub fn encode(target: u32) -> (u16, u16) {
    let hi = (target.wrapping_add(0x8000) >> 16) as u16;
    (hi, target as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain() {
        assert_eq!(decode(0x8002, 0x1234), 0x8002_1234);
    }

    #[test]
    fn test_decode_sign_bit() {
        // lui 0x8002 + addiu -0x0A10
        assert_eq!(decode(0x8002, 0xF5F0), 0x8001_F5F0);
    }

    #[test]
    fn test_encode_biases_hi() {
        assert_eq!(encode(0x8001_F5F0), (0x8002, 0xF5F0));
        assert_eq!(encode(0x8001_7FFF), (0x8001, 0x7FFF));
    }

    #[test]
    fn test_round_trip() {
        let targets = [
            0u32,
            0x8000,
            0xFFFF,
            0x8001_0000,
            0x8001_8000,
            0x801E_F5F0,
            0xFFFF_8000,
            0xFFFF_FFFF,
        ];
        for target in targets {
            let (hi, lo) = encode(target);
            assert_eq!(decode(hi, lo), target, "target {:#x}", target);
        }
    }
}
