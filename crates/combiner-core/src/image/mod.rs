//! In-memory executable image
//!
//! An [`Image`] owns the bytes of one executable together with the
//! [`AddressTranslator`] that places them in the address space. Every accessor
//! takes a virtual address, the same way the game code refers to its data.

mod header;
pub mod reference;
mod translate;

use std::ops::Range;

use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::exe;
use crate::pattern::Pattern;

pub use header::ExeHeader;
#[cfg(test)]
pub(crate) use header::build_header;
pub use translate::{AddressTranslator, ImageLayout};

#[derive(Debug, Clone)]
pub struct Image {
    data: Vec<u8>,
    translator: AddressTranslator,
    header: Option<ExeHeader>,
}

impl Image {
    /// Raw image whose first byte loads at `base`
    pub fn headless(data: Vec<u8>, base: u32) -> Self {
        let translator = AddressTranslator::headless(base, data.len());
        Self {
            data,
            translator,
            header: None,
        }
    }

    /// PS-X EXE image, placed using its own header
    pub fn with_header(data: Vec<u8>) -> Result<Self> {
        let header = ExeHeader::parse(&data)?;
        let translator = AddressTranslator::new(header.text_address, exe::HEADER_SIZE, data.len());
        debug!(
            "PS-X EXE: text 0x{:08X} (+0x{:X}), pc 0x{:08X}",
            header.text_address, header.text_size, header.initial_pc
        );
        Ok(Self {
            data,
            translator,
            header: Some(header),
        })
    }

    pub fn from_layout(data: Vec<u8>, layout: ImageLayout) -> Result<Self> {
        match layout {
            ImageLayout::Headless { base } => Ok(Self::headless(data, base)),
            ImageLayout::Headed => Self::with_header(data),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn header(&self) -> Option<&ExeHeader> {
        self.header.as_ref()
    }

    pub fn translator(&self) -> &AddressTranslator {
        &self.translator
    }

    pub fn to_virtual(&self, offset: usize) -> u32 {
        self.translator.to_virtual(offset)
    }

    pub fn to_offset(&self, address: u32) -> Result<usize> {
        self.translator.to_offset(address)
    }

    /// Address one past the last byte; appended data starts here
    pub fn end_address(&self) -> u32 {
        self.translator.to_virtual(self.data.len())
    }

    /// Virtual address of the first match plus the pattern's result offset
    pub fn locate(&self, pattern: &Pattern) -> Result<u32> {
        let offset = pattern
            .find_first(&self.data)
            .ok_or_else(|| Error::PatternNotFound {
                pattern: pattern.to_string(),
            })?;
        let address = self.to_virtual(offset + pattern.result_offset());
        debug!("Pattern [{}] -> 0x{:08X}", pattern, address);
        Ok(address)
    }

    fn range(&self, address: u32, len: usize) -> Result<Range<usize>> {
        let offset = self.to_offset(address)?;
        let end = offset.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(offset..end),
            None => Err(Error::Bounds {
                offset,
                len,
                size: self.data.len(),
            }),
        }
    }

    pub fn bytes_at(&self, address: u32, len: usize) -> Result<&[u8]> {
        let range = self.range(address, len)?;
        Ok(&self.data[range])
    }

    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<()> {
        let range = self.range(address, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    pub fn fill_zero(&mut self, address: u32, len: usize) -> Result<()> {
        let range = self.range(address, len)?;
        self.data[range].fill(0);
        Ok(())
    }

    pub fn read_u16(&self, address: u32) -> Result<u16> {
        let bytes = self.bytes_at(address, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&self, address: u32) -> Result<u32> {
        let bytes = self.bytes_at(address, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    /// Write consecutive signed halfwords (table entries)
    pub fn write_i16_table(&mut self, address: u32, values: &[i16]) -> Result<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.write_bytes(address, &bytes)
    }

    /// `address + delta` for pointers read out of the image, which may be garbage
    pub fn offset_address(&self, address: u32, delta: u32) -> Result<u32> {
        address
            .checked_add(delta)
            .ok_or(Error::OutOfRange { address })
    }

    /// Read a 32-bit pointer
    pub fn read_address(&self, address: u32) -> Result<u32> {
        self.read_u32(address)
    }

    pub fn write_address(&mut self, address: u32, target: u32) -> Result<()> {
        self.write_u32(address, target)
    }

    /// Decode the address built by the immediates at `hi` and `lo`
    pub fn read_indirect(&self, hi: u32, lo: u32) -> Result<u32> {
        Ok(reference::decode(self.read_u16(hi)?, self.read_u16(lo)?))
    }

    /// Rewrite the immediates at `hi` and `lo` to build `target`
    pub fn write_indirect(&mut self, hi: u32, lo: u32, target: u32) -> Result<()> {
        // Validate both sites before touching either
        self.range(hi, 2)?;
        self.range(lo, 2)?;
        let (hi_value, lo_value) = reference::encode(target);
        self.write_u16(hi, hi_value)?;
        self.write_u16(lo, lo_value)
    }

    /// Extend the buffer with `bytes` and keep the header consistent
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        self.translator = AddressTranslator::new(
            self.translator.base_address(),
            self.translator.header_size(),
            self.data.len(),
        );
        if let Some(header) = self.header.as_mut() {
            header.text_size = (self.data.len() - exe::HEADER_SIZE) as u32;
            header.write_text_size(&mut self.data);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
