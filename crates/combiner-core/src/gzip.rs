//! Gzip members embedded in executables
//!
//! The game links some compressed resources straight into its overlays. They
//! carry no length field, so the only way to learn how many bytes a member
//! occupies is to decompress growing prefixes until one succeeds.

use std::io::{self, Read, Write};

use encoding_rs::WINDOWS_1252;
use flate2::bufread::GzDecoder;
use flate2::{Compression, GzBuilder};
use tracing::{debug, info};

use crate::append::AppendBuffer;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::layout::APPEND_ALIGNMENT;

/// Fixed part of a gzip header; nothing shorter can decode
const MIN_MEMBER_SIZE: usize = 10;

const FLAG_OFFSET: usize = 3;
const FLAG_FEXTRA: u8 = 0x04;
const FLAG_FNAME: u8 = 0x08;

/// A decoded gzip member and where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipBlob {
    pub offset: usize,
    pub compressed_len: usize,
    pub payload: Vec<u8>,
    pub filename: Option<String>,
}

enum Attempt {
    Complete(Vec<u8>),
    Incomplete,
    Invalid,
}

fn try_decompress(slice: &[u8]) -> Attempt {
    let mut decoder = GzDecoder::new(slice);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Attempt::Complete(out),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Attempt::Incomplete,
        Err(_) => Attempt::Invalid,
    }
}

impl GzipBlob {
    /// Find the gzip member starting at `offset` and measure it exactly.
    ///
    /// A prefix that ends mid-stream is grown by one byte. Any other decode
    /// failure means there is no member here, as does running out of buffer.
    pub fn find(data: &[u8], offset: usize) -> Result<Self> {
        let available = data.get(offset..).ok_or(Error::GzipFormat { offset })?;

        let mut size = MIN_MEMBER_SIZE;
        while size <= available.len() {
            match try_decompress(&available[..size]) {
                Attempt::Complete(payload) => {
                    let filename = read_filename(&available[..size]);
                    debug!(
                        "Gzip member at 0x{:X}: {} bytes -> {} bytes, name {:?}",
                        offset,
                        size,
                        payload.len(),
                        filename
                    );
                    return Ok(Self {
                        offset,
                        compressed_len: size,
                        payload,
                        filename,
                    });
                }
                Attempt::Incomplete => size += 1,
                Attempt::Invalid => break,
            }
        }

        Err(Error::GzipFormat { offset })
    }
}

/// Original filename from a complete member's header, if it has one
pub fn read_filename(member: &[u8]) -> Option<String> {
    let flags = *member.get(FLAG_OFFSET)?;
    if flags & FLAG_FNAME == 0 {
        return None;
    }

    let mut name_offset = MIN_MEMBER_SIZE;
    if flags & FLAG_FEXTRA != 0 {
        let extra = member.get(name_offset..name_offset + 2)?;
        name_offset += u16::from_le_bytes([extra[0], extra[1]]) as usize + 2;
    }

    let rest = member.get(name_offset..)?;
    let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&rest[..len]);
    Some(decoded.into_owned())
}

/// Compress `payload` as a single member, storing `filename` when given
pub fn compress(payload: &[u8], filename: Option<&str>) -> Result<Vec<u8>> {
    let mut builder = GzBuilder::new();
    if let Some(name) = filename {
        let name = name.split('\0').next().unwrap_or_default();
        let (bytes, _, _) = WINDOWS_1252.encode(name);
        builder = builder.filename(bytes.into_owned());
    }

    let mut encoder = builder.write(Vec::new(), Compression::best());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

/// Result of compressing a payload for a slot of known size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlob {
    pub bytes: Vec<u8>,
    /// Compressions performed: 1, or 2 when the nameless fallback ran
    pub attempts: u8,
    pub filename_kept: bool,
    pub fits: bool,
}

/// Compress for a slot of `slot_len` bytes.
///
/// If the member is too long with a filename, compress once more without it.
/// The result is used either way; `fits` tells the caller where it can go.
pub fn encode_for_slot(payload: &[u8], filename: Option<&str>, slot_len: usize) -> Result<EncodedBlob> {
    let mut bytes = compress(payload, filename)?;
    let mut attempts = 1;
    let mut filename_kept = filename.is_some();

    if bytes.len() > slot_len && filename.is_some() {
        debug!(
            "Recompressed member is {} bytes (slot {}), dropping the filename",
            bytes.len(),
            slot_len
        );
        bytes = compress(payload, None)?;
        attempts = 2;
        filename_kept = false;
    }

    let fits = bytes.len() <= slot_len;
    Ok(EncodedBlob {
        bytes,
        attempts,
        filename_kept,
        fits,
    })
}

/// Where a re-encoded member ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    InPlace { address: u32, len: usize },
    Appended { address: u32, len: usize },
}

/// Replace the gzip member referenced by the hi/lo pair at `hi`/`lo`.
///
/// `edit` rewrites the decompressed payload. The original region is always
/// zeroed; the new member goes back in place when it fits, otherwise it is
/// appended and the reference repointed.
pub fn replace_embedded<F>(
    image: &mut Image,
    append: &mut AppendBuffer,
    hi: u32,
    lo: u32,
    default_name: Option<&str>,
    edit: F,
) -> Result<Placement>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let address = image.read_indirect(hi, lo)?;
    let offset = image.to_offset(address)?;
    let blob = GzipBlob::find(image.as_bytes(), offset)?;

    let mut payload = blob.payload;
    edit(&mut payload)?;

    let filename = blob.filename.as_deref().or(default_name);
    let encoded = encode_for_slot(&payload, filename, blob.compressed_len)?;

    image.fill_zero(address, blob.compressed_len)?;
    let placement = if encoded.fits {
        image.write_bytes(address, &encoded.bytes)?;
        Placement::InPlace {
            address,
            len: encoded.bytes.len(),
        }
    } else {
        let new_address = append.append_aligned(&encoded.bytes, APPEND_ALIGNMENT);
        image.write_indirect(hi, lo, new_address)?;
        Placement::Appended {
            address: new_address,
            len: encoded.bytes.len(),
        }
    };

    info!(
        "Re-embedded gzip member ({} -> {} bytes): {:?}",
        blob.compressed_len,
        encoded.bytes.len(),
        placement
    );
    Ok(placement)
}
