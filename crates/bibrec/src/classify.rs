//! Line classification for the BibTeX-like format
//!
//! Every source line is exactly one of: blank, entry start (`@type{key,`),
//! field assignment (`name = value,`), entry end (`}` or `)`), or
//! unrecognized. Kinds are tried in that order and the first match wins.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENTRY_START: Regex = Regex::new(r"^\s*@\w+[{(](\S+),").unwrap();
    /// The value is captured lazily so an optional trailing comma and
    /// trailing whitespace (including the line terminator) are left out.
    static ref FIELD_LINE: Regex = Regex::new(r"^\s*(\w+)\s*=\s*(.*?),?\s*$").unwrap();
}

/// The kind of a single source line, with its captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    EntryStart { key: &'a str },
    Field { name: &'a str, raw_value: &'a str },
    EntryEnd,
    Unrecognized,
}

/// Classify one line. A trailing `\n` or `\r\n` is tolerated.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = ENTRY_START.captures(line) {
        if let Some(key) = caps.get(1) {
            return LineKind::EntryStart { key: key.as_str() };
        }
    }

    if let Some(caps) = FIELD_LINE.captures(line) {
        if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
            return LineKind::Field {
                name: name.as_str(),
                raw_value: value.as_str(),
            };
        }
    }

    match line.trim() {
        "}" | ")" => LineKind::EntryEnd,
        _ => LineKind::Unrecognized,
    }
}
