//! Wildcarded byte signatures
//!
//! Patterns are written the same way as in disassembler listings:
//! `"00 00 00 00 ?? ?? ?? ?? 01 00 04 24"`. A `??` (or `?`) token matches any
//! byte. Matching is a linear, leftmost-first scan.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Option<u8>>,
    result_offset: usize,
    /// First literal byte and its index; `None` when every token is a wildcard
    anchor: Option<(usize, u8)>,
}

impl Pattern {
    pub fn new(tokens: Vec<Option<u8>>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }
        let anchor = tokens
            .iter()
            .enumerate()
            .find_map(|(i, token)| token.map(|byte| (i, byte)));
        Ok(Self {
            tokens,
            result_offset: 0,
            anchor,
        })
    }

    pub fn parse(pattern: &str) -> Result<Self> {
        Self::new(parse_pattern(pattern)?)
    }

    /// Point results at the operand `offset` bytes into the match
    pub fn with_result_offset(mut self, offset: usize) -> Self {
        self.result_offset = offset;
        self
    }

    pub fn tokens(&self) -> &[Option<u8>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn result_offset(&self) -> usize {
        self.result_offset
    }

    fn matches_at(&self, haystack: &[u8], pos: usize) -> bool {
        haystack[pos..pos + self.tokens.len()]
            .iter()
            .zip(&self.tokens)
            .all(|(byte, token)| token.is_none_or(|expected| *byte == expected))
    }

    /// Offset of the first match starting at or after `start`
    pub fn find_from(&self, haystack: &[u8], start: usize) -> Option<usize> {
        let len = self.tokens.len();
        if haystack.len() < len {
            return None;
        }
        let last_start = haystack.len() - len;

        let Some((anchor_index, anchor_byte)) = self.anchor else {
            return (start <= last_start).then_some(start);
        };

        let mut pos = start;
        while pos <= last_start {
            let window = &haystack[pos + anchor_index..=last_start + anchor_index];
            let candidate = pos + memchr::memchr(anchor_byte, window)?;
            if self.matches_at(haystack, candidate) {
                return Some(candidate);
            }
            pos = candidate + 1;
        }
        None
    }

    /// Offset of the first match in `haystack`
    pub fn find_first(&self, haystack: &[u8]) -> Option<usize> {
        self.find_from(haystack, 0)
    }

    /// Lazy iterator over every match start, overlapping matches included
    pub fn find_all<'p, 'h>(&'p self, haystack: &'h [u8]) -> Matches<'p, 'h> {
        Matches {
            pattern: self,
            haystack,
            next: 0,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pattern(&self.tokens))
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator returned by [`Pattern::find_all`]
#[derive(Debug, Clone)]
pub struct Matches<'p, 'h> {
    pattern: &'p Pattern,
    haystack: &'h [u8],
    next: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self.pattern.find_from(self.haystack, self.next)?;
        self.next = found + 1;
        Some(found)
    }
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<Option<u8>>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            bytes.push(None);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
        })?;
        bytes.push(Some(value));
    }

    if bytes.is_empty() {
        return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[Option<u8>]) -> String {
    bytes
        .iter()
        .map(|b| match b {
            Some(value) => format!("{:02X}", value),
            None => "??".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern_with_wildcards() {
        let bytes = parse_pattern("00 00 ?? ?? 01 00 04 24").unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0], Some(0x00));
        assert_eq!(bytes[2], None);
        assert_eq!(bytes[7], Some(0x24));
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(matches!(parse_pattern(""), Err(Error::InvalidPattern(_))));
        assert!(parse_pattern("01 XY").is_err());
        assert!(parse_pattern("100").is_err());
    }

    #[test]
    fn test_format_pattern() {
        let pattern = Pattern::parse("3c ? 42 24").unwrap();
        assert_eq!(pattern.to_string(), "3C ?? 42 24");
    }

    #[test]
    fn test_find_first_is_leftmost() {
        let pattern = Pattern::parse("02 3C").unwrap();
        let haystack = [0x00, 0x02, 0x3C, 0x02, 0x3C];
        assert_eq!(pattern.find_first(&haystack), Some(1));
    }

    #[test]
    fn test_leading_wildcards() {
        let pattern = Pattern::parse("?? ?? 02 3C").unwrap();
        assert_eq!(pattern.find_first(&[0x02, 0x3C]), None);
        assert_eq!(pattern.find_first(&[0x02, 0x3C, 0x02, 0x3C]), Some(0));
        assert_eq!(pattern.find_first(&[0xAA, 0xBB, 0xCC, 0x02, 0x3C]), Some(1));
    }

    #[test]
    fn test_anchor_rejects_partial_matches() {
        let pattern = Pattern::parse("10 00 BF 8F").unwrap();
        let haystack = [0x10, 0x00, 0xBF, 0x00, 0x10, 0x00, 0xBF, 0x8F];
        assert_eq!(pattern.find_first(&haystack), Some(4));
    }

    #[test]
    fn test_match_at_end_of_buffer() {
        let pattern = Pattern::parse("AA BB").unwrap();
        assert_eq!(pattern.find_first(&[0x00, 0x00, 0xAA, 0xBB]), Some(2));
        assert_eq!(pattern.find_first(&[0x00, 0x00, 0x00, 0xAA]), None);
    }

    #[test]
    fn test_all_wildcards() {
        let pattern = Pattern::parse("?? ??").unwrap();
        assert_eq!(pattern.find_first(&[1, 2, 3]), Some(0));
        assert_eq!(pattern.find_all(&[1, 2, 3]).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(pattern.find_first(&[1]), None);
    }

    #[test]
    fn test_find_all_overlapping_and_terminates() {
        let pattern = Pattern::parse("00 ?? 00").unwrap();
        let haystack = [0x00, 0x01, 0x00, 0x02, 0x00, 0xFF];
        let found: Vec<_> = pattern.find_all(&haystack).collect();
        assert_eq!(found, vec![0, 2]);

        let mut matches = pattern.find_all(&haystack);
        matches.next();
        matches.next();
        assert_eq!(matches.next(), None);
        assert_eq!(matches.next(), None);
    }

    #[test]
    fn test_result_offset_is_carried() {
        let pattern = Pattern::parse("07 00 62 2C").unwrap().with_result_offset(4);
        assert_eq!(pattern.result_offset(), 4);
        assert_eq!(pattern.len(), 4);
    }
}
