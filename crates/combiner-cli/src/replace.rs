//! Replacement files for the VOL archive
//!
//! `file.hashes` records the CRC32 of each original file the replacements
//! overwrite. A destination whose contents no longer match was modified by
//! someone else and is left alone.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Crc;
use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

pub const HASHES_FILE: &str = "file.hashes";

/// Result of one replacement pass
#[derive(Debug, Default)]
pub struct ReplaceSummary {
    pub copied: usize,
    /// Relative paths left alone because they were already modified
    pub skipped: Vec<String>,
}

/// `relative/path` with forward slashes, the form used as hash key
fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/")
}

/// Parse `HEX=relative/path` lines. Malformed lines are skipped.
pub fn parse_hashes(content: &str) -> HashMap<String, u32> {
    content
        .lines()
        .filter_map(|line| {
            let (value, key) = line.split_once('=')?;
            match u32::from_str_radix(value.trim(), 16) {
                Ok(hash) => Some((normalize(key), hash)),
                Err(_) => {
                    warn!("Ignoring malformed hash line: {}", line);
                    None
                }
            }
        })
        .collect()
}

/// CRC32 of the file's decompressed contents, or of its raw bytes if it is
/// not gzip
pub fn content_crc(path: &Path) -> Result<u32> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut decompressed = Vec::new();
    let data = match MultiGzDecoder::new(raw.as_slice()).read_to_end(&mut decompressed) {
        Ok(_) => &decompressed,
        Err(_) => &raw,
    };

    let mut crc = Crc::new();
    crc.update(data);
    Ok(crc.sum())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Copy every file under `source` into `dest`, keeping relative paths
pub fn replace_files(source: &Path, dest: &Path) -> Result<ReplaceSummary> {
    let hashes = match fs::read_to_string(source.join(HASHES_FILE)) {
        Ok(content) => parse_hashes(&content),
        Err(e) => {
            warn!("{} has been removed or cannot be read: {}", HASHES_FILE, e);
            HashMap::new()
        }
    };

    let mut files = Vec::new();
    collect_files(source, &mut files)?;
    files.sort();

    let mut summary = ReplaceSummary::default();
    for src in files {
        if src.file_name().is_some_and(|name| name == HASHES_FILE) {
            continue;
        }
        let relative = src.strip_prefix(source).with_context(|| {
            format!("{} is outside {}", src.display(), source.display())
        })?;
        let key = normalize(&relative.to_string_lossy());

        let dst = dest.join(relative);
        if let Some(&expected) = hashes.get(&key) {
            let actual = content_crc(&dst)?;
            if actual != expected {
                warn!("{} was not overwritten as it is already modified", key);
                summary.skipped.push(key);
                continue;
            }
        }

        fs::copy(&src, &dst)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
        debug!("Replaced {}", key);
        summary.copied += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn crc_of(data: &[u8]) -> u32 {
        let mut crc = Crc::new();
        crc.update(data);
        crc.sum()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_parse_hashes() {
        let hashes = parse_hashes("DEADBEEF=.text\\data-race.txd\r\nnot a line\nzz=bad\n0000FFFF = menu.bin\n");
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[".text/data-race.txd"], 0xDEAD_BEEF);
        assert_eq!(hashes["menu.bin"], 0xFFFF);
    }

    #[test]
    fn test_content_crc_sees_through_gzip() {
        let temp = tempfile::tempdir().unwrap();
        let raw = temp.path().join("raw.bin");
        let packed = temp.path().join("packed.bin");
        fs::write(&raw, b"course data").unwrap();
        fs::write(&packed, gzip(b"course data")).unwrap();

        assert_eq!(content_crc(&raw).unwrap(), crc_of(b"course data"));
        assert_eq!(content_crc(&packed).unwrap(), crc_of(b"course data"));
    }

    #[test]
    fn test_replace_only_unmodified_files() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("replacements");
        let dest = temp.path().join("vol");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::create_dir_all(dest.join("sub")).unwrap();

        fs::write(dest.join("a.bin"), gzip(b"original a")).unwrap();
        fs::write(dest.join("sub").join("b.bin"), b"edited b").unwrap();
        fs::write(source.join("a.bin"), b"new a").unwrap();
        fs::write(source.join("sub").join("b.bin"), b"new b").unwrap();
        fs::write(source.join("c.bin"), b"new c").unwrap();
        fs::write(
            source.join(HASHES_FILE),
            format!(
                "{:08X}=a.bin\n{:08X}=sub\\b.bin\n",
                crc_of(b"original a"),
                crc_of(b"original b")
            ),
        )
        .unwrap();

        let summary = replace_files(&source, &dest).unwrap();
        assert_eq!(summary.copied, 2);
        assert_eq!(summary.skipped, vec!["sub/b.bin".to_string()]);
        assert_eq!(fs::read(dest.join("a.bin")).unwrap(), b"new a");
        assert_eq!(fs::read(dest.join("sub").join("b.bin")).unwrap(), b"edited b");
        assert_eq!(fs::read(dest.join("c.bin")).unwrap(), b"new c");
        assert!(!dest.join(HASHES_FILE).exists());
    }

    #[test]
    fn test_nested_hashes_files_are_not_copied() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("replacements");
        let dest = temp.path().join("vol");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::create_dir_all(dest.join("sub")).unwrap();
        fs::write(source.join("sub").join(HASHES_FILE), "00000000=x.bin\n").unwrap();
        fs::write(source.join("sub").join("b.bin"), b"new b").unwrap();

        let summary = replace_files(&source, &dest).unwrap();
        assert_eq!(summary.copied, 1);
        assert!(!dest.join("sub").join(HASHES_FILE).exists());
        assert_eq!(fs::read(dest.join("sub").join("b.bin")).unwrap(), b"new b");
    }

    #[test]
    fn test_missing_hashes_copies_everything() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("replacements");
        let dest = temp.path().join("vol");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.bin"), b"edited").unwrap();
        fs::write(source.join("a.bin"), b"new").unwrap();

        let summary = replace_files(&source, &dest).unwrap();
        assert_eq!(summary.copied, 1);
        assert_eq!(fs::read(dest.join("a.bin")).unwrap(), b"new");
    }
}
