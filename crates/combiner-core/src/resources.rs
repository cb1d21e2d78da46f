//! Per-locale resource records
//!
//! The expanded main menu needs one block of item definitions per language,
//! plus the shared data transfer box entry. The blocks are opaque binary
//! records supplied next to the program, one file per key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::error::{Error, Result};

/// Menu languages, in the order their blocks are laid out in memory
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
pub enum Locale {
    #[strum(serialize = "jp")]
    Japanese,
    #[strum(serialize = "en-us")]
    EnglishUs,
    #[strum(serialize = "en-uk")]
    EnglishUk,
    #[strum(serialize = "fr")]
    French,
    #[strum(serialize = "de")]
    German,
    #[strum(serialize = "it")]
    Italian,
    #[strum(serialize = "es")]
    Spanish,
}

impl Locale {
    pub fn key(&self) -> &'static str {
        self.into()
    }
}

/// Key of the data transfer box record
pub const MISC_RECORD: &str = "misc";

/// Source of fixed-size records selected by key
pub trait RecordSource {
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Read a record and check it has exactly `expected` bytes
    fn read_sized(&self, key: &str, expected: usize) -> Result<Vec<u8>> {
        let record = self.read(key)?;
        if record.len() != expected {
            return Err(Error::RecordSize {
                key: key.to_string(),
                expected,
                actual: record.len(),
            });
        }
        Ok(record)
    }
}

/// Records stored as `<dir>/<key>.bin`
#[derive(Debug, Clone)]
pub struct DirectoryRecords {
    dir: PathBuf,
}

impl DirectoryRecords {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }
}

impl RecordSource for DirectoryRecords {
    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        debug!("Reading record {}", path.display());
        Ok(fs::read(path)?)
    }
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecords {
    records: HashMap<String, Vec<u8>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, record: Vec<u8>) {
        self.records.insert(key.into(), record);
    }
}

impl RecordSource for MemoryRecords {
    fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.records.get(key).cloned().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("record '{}' not found", key),
            ))
        })
    }
}
