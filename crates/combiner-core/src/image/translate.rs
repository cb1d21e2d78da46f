//! Offset <-> virtual address translation

use crate::error::{Error, Result};

/// How a file maps onto the address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Raw load image: byte 0 is loaded at `base`
    Headless { base: u32 },
    /// PS-X EXE: the header supplies the load address of the text section
    Headed,
}

/// Maps buffer offsets to the addresses the code sees at runtime.
///
/// Byte `header_size` of the buffer sits at `base`. Header bytes map to the
/// addresses directly below it, so every offset in `[0, len)` has exactly one
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressTranslator {
    base: u32,
    header_size: usize,
    len: usize,
}

impl AddressTranslator {
    pub fn new(base: u32, header_size: usize, len: usize) -> Self {
        Self {
            base,
            header_size,
            len,
        }
    }

    pub fn headless(base: u32, len: usize) -> Self {
        Self::new(base, 0, len)
    }

    /// Load address of the first addressable (non-header) byte
    pub fn base_address(&self) -> u32 {
        self.base
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn origin(&self) -> u32 {
        self.base.wrapping_sub(self.header_size as u32)
    }

    /// Total over all offsets, including one-past-the-end
    pub fn to_virtual(&self, offset: usize) -> u32 {
        self.origin().wrapping_add(offset as u32)
    }

    pub fn to_offset(&self, address: u32) -> Result<usize> {
        let offset = address.wrapping_sub(self.origin()) as usize;
        if offset >= self.len {
            return Err(Error::OutOfRange { address });
        }
        Ok(offset)
    }

    pub fn contains(&self, address: u32) -> bool {
        self.to_offset(address).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_round_trip() {
        let t = AddressTranslator::headless(0x8001_0000, 0x1000);
        for offset in [0usize, 1, 0x7FF, 0xFFF] {
            assert_eq!(t.to_offset(t.to_virtual(offset)).unwrap(), offset);
        }
        assert_eq!(t.to_virtual(0), 0x8001_0000);
        assert_eq!(t.to_virtual(0x1000), 0x8001_1000);
    }

    #[test]
    fn test_out_of_range() {
        let t = AddressTranslator::headless(0x8001_0000, 0x100);
        assert!(matches!(
            t.to_offset(0x8001_0100),
            Err(Error::OutOfRange { address: 0x8001_0100 })
        ));
        assert!(t.to_offset(0x8000_FFFF).is_err());
        assert!(!t.contains(0));
    }

    #[test]
    fn test_header_maps_below_base() {
        let t = AddressTranslator::new(0x8001_0000, 0x800, 0x1800);
        assert_eq!(t.to_virtual(0x800), 0x8001_0000);
        assert_eq!(t.to_virtual(0), 0x8000_F800);
        assert_eq!(t.to_offset(0x8001_0004).unwrap(), 0x804);
        for offset in 0..t.len() {
            assert_eq!(t.to_offset(t.to_virtual(offset)).unwrap(), offset);
        }
    }
}
