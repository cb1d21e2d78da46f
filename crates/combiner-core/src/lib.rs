//! # combiner-core
//!
//! Core library for the GT2 disc combiner.
//!
//! This crate provides:
//! - Executable images with virtual address translation (PS-X EXE and overlays)
//! - Byte pattern scanning with wildcards
//! - Transactional patch sessions with mandatory and optional steps
//! - Embedded gzip member replacement
//! - The patch catalogue that turns the Simulation disc into a combined disc

pub mod append;
pub mod error;
pub mod gzip;
pub mod image;
pub mod layout;
pub mod patches;
pub mod pattern;
pub mod resources;
pub mod session;

pub use append::AppendBuffer;
pub use error::{Error, Result};
pub use gzip::{EncodedBlob, GzipBlob, Placement, compress, encode_for_slot, replace_embedded};
pub use image::{AddressTranslator, ExeHeader, Image, ImageLayout};
pub use patches::boot::boot_executable_name;
pub use pattern::{Pattern, format_pattern, parse_pattern};
pub use resources::{DirectoryRecords, Locale, MemoryRecords, RecordSource};
pub use session::{
    FailurePolicy, ImageReport, PatchContext, PatchSession, PatchStep, Requirement,
    SessionReport, StepOutcome, StepReport, patch_file,
};
