use crate::error::{Error, Result};
use crate::layout::exe;

/// Fields of the PS-X EXE header the patcher consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExeHeader {
    pub initial_pc: u32,
    pub text_address: u32,
    pub text_size: u32,
}

impl ExeHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < exe::HEADER_SIZE {
            return Err(Error::InvalidHeader(format!(
                "file is {} bytes, header needs {}",
                data.len(),
                exe::HEADER_SIZE
            )));
        }
        if &data[..exe::MAGIC.len()] != exe::MAGIC {
            return Err(Error::InvalidHeader("missing PS-X EXE magic".to_string()));
        }

        let word = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        Ok(Self {
            initial_pc: word(exe::INITIAL_PC),
            text_address: word(exe::TEXT_ADDRESS),
            text_size: word(exe::TEXT_SIZE),
        })
    }

    /// Store `text_size` back into a header buffer
    pub fn write_text_size(&self, data: &mut [u8]) {
        data[exe::TEXT_SIZE..exe::TEXT_SIZE + 4].copy_from_slice(&self.text_size.to_le_bytes());
    }
}

#[cfg(test)]
pub(crate) fn build_header(text_address: u32, text_size: u32) -> Vec<u8> {
    let mut data = vec![0u8; exe::HEADER_SIZE];
    data[..8].copy_from_slice(exe::MAGIC);
    data[exe::INITIAL_PC..exe::INITIAL_PC + 4].copy_from_slice(&text_address.to_le_bytes());
    data[exe::TEXT_ADDRESS..exe::TEXT_ADDRESS + 4].copy_from_slice(&text_address.to_le_bytes());
    data[exe::TEXT_SIZE..exe::TEXT_SIZE + 4].copy_from_slice(&text_size.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let data = build_header(0x8001_0000, 0x2000);
        let header = ExeHeader::parse(&data).unwrap();
        assert_eq!(header.text_address, 0x8001_0000);
        assert_eq!(header.initial_pc, 0x8001_0000);
        assert_eq!(header.text_size, 0x2000);
    }

    #[test]
    fn test_rejects_bad_magic_and_short_input() {
        let mut data = build_header(0x8001_0000, 0);
        data[0] = b'X';
        assert!(matches!(ExeHeader::parse(&data), Err(Error::InvalidHeader(_))));
        assert!(ExeHeader::parse(&data[..0x10]).is_err());
    }

    #[test]
    fn test_write_text_size() {
        let mut data = build_header(0x8001_0000, 0x800);
        let mut header = ExeHeader::parse(&data).unwrap();
        header.text_size = 0x1000;
        header.write_text_size(&mut data);
        assert_eq!(ExeHeader::parse(&data).unwrap().text_size, 0x1000);
    }
}
