//! Data appended past the end of an image
//!
//! Patch steps that need room for new code or relocated tables put it here.
//! The buffer hands out the virtual addresses the bytes will have once the
//! session extends the file, so steps can point at them immediately.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBuffer {
    start: u32,
    bytes: Vec<u8>,
}

impl AppendBuffer {
    /// `start` is the address of the first byte past the image
    pub fn new(start: u32) -> Self {
        Self {
            start,
            bytes: Vec::new(),
        }
    }

    pub fn start_address(&self) -> u32 {
        self.start
    }

    /// Address the next byte will get
    pub fn cursor_address(&self) -> u32 {
        self.start.wrapping_add(self.bytes.len() as u32)
    }

    /// Zero-pad until the cursor is a multiple of `alignment`
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two.
    pub fn align_to(&mut self, alignment: u32) -> u32 {
        assert!(
            alignment.is_power_of_two(),
            "alignment must be a power of two, got {}",
            alignment
        );
        let cursor = self.cursor_address();
        let padding = cursor.wrapping_neg() & (alignment - 1);
        self.bytes.resize(self.bytes.len() + padding as usize, 0);
        self.cursor_address()
    }

    /// Write `data` at the cursor and return the address it landed at
    pub fn append(&mut self, data: &[u8]) -> u32 {
        let address = self.cursor_address();
        self.bytes.extend_from_slice(data);
        address
    }

    /// Align, then append
    pub fn append_aligned(&mut self, data: &[u8], alignment: u32) -> u32 {
        self.align_to(alignment);
        self.append(data)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop everything written after `len` bytes (checkpoint restore)
    pub(crate) fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_pads_with_zeros() {
        let mut buffer = AppendBuffer::new(0x8001_0001);
        assert_eq!(buffer.align_to(4), 0x8001_0004);
        assert_eq!(buffer.as_bytes(), &[0, 0, 0]);
    }

    #[test]
    fn test_align_is_monotonic_and_idempotent() {
        for start in 0x8001_0000u32..0x8001_0010 {
            let mut buffer = AppendBuffer::new(start);
            let aligned = buffer.align_to(4);
            assert!(aligned >= start);
            assert_eq!(aligned % 4, 0);
            assert_eq!(buffer.align_to(4), aligned);
            assert_eq!(buffer.len() as u32, aligned - start);
        }
    }

    #[test]
    fn test_append_advances_cursor() {
        let mut buffer = AppendBuffer::new(0x8001_0002);
        let first = buffer.append_aligned(&[1, 2, 3], 4);
        assert_eq!(first, 0x8001_0004);
        assert_eq!(buffer.cursor_address(), 0x8001_0007);

        let second = buffer.append_aligned(&[4; 4], 4);
        assert_eq!(second, 0x8001_0008);
        assert!(second > first);
        assert_eq!(buffer.as_bytes(), &[0, 0, 1, 2, 3, 0, 4, 4, 4, 4]);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_align_rejects_non_power_of_two() {
        AppendBuffer::new(0).align_to(3);
    }
}
