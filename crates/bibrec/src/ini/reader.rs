//! INI-style bibliography reader
//!
//! Format:
//! ```text
//! [doe2020]
//! author = Doe, Jane
//! year: 2020
//! note = first line
//!     continued line
//! ```
//! Each section becomes one entry whose key is the section name. Values are
//! read as-is; no `%` interpolation is performed. While a field is open, any
//! indented line (including a bare tab) is part of its value. Each value line
//! is trimmed, so leading and trailing whitespace does not survive.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::bib::Bib;
use crate::entry::{Entry, KEY_FIELD};
use crate::error::{BibError, Result};

/// Reader for INI-style bibliography files
#[derive(Debug, Default, Clone, Copy)]
pub struct BibParser;

impl BibParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse files in order into one collection.
    ///
    /// A section that appears in more than one file is merged into a single
    /// entry at the position of its first appearance; later values win.
    /// Entries are appended to `append_to` when given.
    pub fn parse_bib<P: AsRef<Path>>(&self, filenames: &[P], append_to: Option<Bib>) -> Result<Bib> {
        let mut sections = Sections::default();
        for filename in filenames {
            let path = filename.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| BibError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            sections.read_source(&path.display().to_string(), &text)?;
        }
        let mut bib = append_to.unwrap_or_default();
        bib.extend(sections.into_entries());
        Ok(bib)
    }

    /// Parse a single named in-memory source
    pub fn parse_str(&self, source: &str, text: &str, append_to: Option<Bib>) -> Result<Bib> {
        let mut sections = Sections::default();
        sections.read_source(source, text)?;
        let mut bib = append_to.unwrap_or_default();
        bib.extend(sections.into_entries());
        Ok(bib)
    }
}

/// Sections read so far, in order of first appearance
#[derive(Debug, Default)]
struct Sections {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Sections {
    fn read_source(&mut self, source: &str, text: &str) -> Result<()> {
        let mut seen_here: HashSet<String> = HashSet::new();
        let mut fields_here: HashSet<String> = HashSet::new();
        let mut current: Option<usize> = None;
        let mut last_field: Option<String> = None;
        let before = self.entries.len();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            // Any indented line continues an open value, even when it is
            // blank or looks like a comment
            if raw.starts_with([' ', '\t']) {
                if let (Some(pos), Some(name)) = (current, last_field.as_deref()) {
                    let entry = &mut self.entries[pos];
                    let value = match entry.get(name) {
                        Some(prev) => format!("{}\n{}", prev, trimmed),
                        None => trimmed.to_string(),
                    };
                    entry.set(name, value);
                    continue;
                }
            }

            if trimmed.is_empty() {
                last_field = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(name) = section_header(trimmed) {
                if name.is_empty() {
                    return Err(BibError::ini_syntax(source, line_no, "empty section name"));
                }
                if !seen_here.insert(name.to_string()) {
                    return Err(BibError::ini_syntax(
                        source,
                        line_no,
                        format!("section '{}' already exists", name),
                    ));
                }
                current = Some(self.section(name));
                fields_here.clear();
                last_field = None;
                continue;
            }

            let Some((name, value)) = split_option(trimmed) else {
                return Err(BibError::ini_syntax(
                    source,
                    line_no,
                    format!("expected 'name = value', found '{}'", trimmed),
                ));
            };
            let Some(pos) = current else {
                return Err(BibError::ini_syntax(source, line_no, "missing section header"));
            };
            if name.is_empty() {
                return Err(BibError::ini_syntax(source, line_no, "empty field name"));
            }
            if !fields_here.insert(name.to_string()) {
                return Err(BibError::ini_syntax(
                    source,
                    line_no,
                    format!("field '{}' already set in this section", name),
                ));
            }
            if name == KEY_FIELD {
                // The section name is the key
                debug!(source, line = line_no, "Ignoring explicit key field");
                last_field = None;
                continue;
            }
            self.entries[pos].set(name, value);
            last_field = Some(name.to_string());
        }

        info!(source, new_sections = self.entries.len() - before, "Parsed INI source");
        Ok(())
    }

    /// Index of the entry for `name`, creating it if needed
    fn section(&mut self, name: &str) -> usize {
        if let Some(&pos) = self.index.get(name) {
            debug!(section = name, "Merging repeated section");
            return pos;
        }
        let pos = self.entries.len();
        self.entries.push(Entry::new(name));
        self.index.insert(name.to_string(), pos);
        pos
    }

    fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split at the first `=` or `:`
fn split_option(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    Some((line[..pos].trim(), line[pos + 1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Bib> {
        BibParser::new().parse_str("test.ini", text, None)
    }

    #[test]
    fn test_parse_sections() {
        let bib = parse("[doe2020]\nauthor = Doe, Jane\nyear: 2020\n\n[roe2019]\ntitle = Hello\n").unwrap();
        assert_eq!(bib.len(), 2);
        let doe = &bib.entries()[0];
        assert_eq!(doe.key(), "doe2020");
        assert_eq!(doe.author(), Some("Doe, Jane"));
        assert_eq!(doe.year(), Some("2020"));
        assert_eq!(doe.month(), None);
        assert_eq!(doe.howpublished(), None);
        assert_eq!(bib.entries()[1].title(), Some("Hello"));
    }

    #[test]
    fn test_value_splits_at_first_delimiter() {
        let bib = parse("[a]\nurl = https://example.com/?q=1\n").unwrap();
        assert_eq!(bib.entries()[0].url(), Some("https://example.com/?q=1"));
    }

    #[test]
    fn test_comments_and_percent_kept_raw() {
        let bib = parse("# leading comment\n[a]\n; inline section comment\nnote = 50%% off\n").unwrap();
        assert_eq!(bib.entries()[0].get("note"), Some("50%% off"));
        assert_eq!(bib.entries()[0].fields().len(), 1);
    }

    #[test]
    fn test_continuation_lines() {
        let bib = parse("[a]\nabstract = first\n\tsecond\n    third\nyear = 2000\n").unwrap();
        let entry = &bib.entries()[0];
        assert_eq!(entry.get("abstract"), Some("first\nsecond\nthird"));
        assert_eq!(entry.year(), Some("2000"));
    }

    #[test]
    fn test_indented_blank_and_comment_lines_continue() {
        let bib = parse("[a]\nabstract = one\n\t# two\n\t\n\tthree\n\n; note\nyear = 2000\n").unwrap();
        let entry = &bib.entries()[0];
        assert_eq!(entry.get("abstract"), Some("one\n# two\n\nthree"));
        assert_eq!(entry.year(), Some("2000"));
    }

    #[test]
    fn test_field_order_preserved() {
        let bib = parse("[a]\nzeta = 1\nalpha = 2\nmid = 3\n").unwrap();
        let names: Vec<_> = bib.entries()[0].fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_explicit_key_field_ignored() {
        let bib = parse("[doe2020]\nkey = other\nyear = 2020\n").unwrap();
        assert_eq!(bib.entries()[0].key(), "doe2020");
        assert!(!bib.entries()[0].fields().iter().any(|f| f.name == "key"));
    }

    #[test]
    fn test_missing_section_header() {
        let err = parse("year = 2020\n").unwrap_err();
        match err {
            BibError::IniSyntax { line, message, .. } => {
                assert_eq!(line, 1);
                assert_eq!(message, "missing section header");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_garbage_line() {
        let err = parse("[a]\nnot an option\n").unwrap_err();
        assert!(matches!(err, BibError::IniSyntax { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_section_in_one_source() {
        let err = parse("[a]\nyear = 1\n[a]\nyear = 2\n").unwrap_err();
        assert!(matches!(err, BibError::IniSyntax { line: 3, .. }));
    }

    #[test]
    fn test_duplicate_field_in_one_section() {
        let err = parse("[a]\nyear = 1\nyear = 2\n").unwrap_err();
        assert!(matches!(err, BibError::IniSyntax { line: 3, .. }));
    }

    #[test]
    fn test_sections_merge_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.ini");
        let second = dir.path().join("second.ini");
        std::fs::write(&first, "[a]\nyear = 2000\ntitle = Old\n[b]\nyear = 2001\n").unwrap();
        std::fs::write(&second, "[c]\nyear = 2002\n[a]\ntitle = New\nmonth = May\n").unwrap();

        let bib = BibParser::new().parse_bib(&[first, second], None).unwrap();
        let keys: Vec<_> = bib.iter().map(Entry::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        let a = &bib.entries()[0];
        assert_eq!(a.title(), Some("New"));
        assert_eq!(a.month(), Some("May"));
        assert_eq!(a.year(), Some("2000"));
    }

    #[test]
    fn test_append_to_existing() {
        let mut existing = Bib::new();
        existing.push(Entry::new("first"));
        let bib = BibParser::new()
            .parse_str("more.ini", "[second]\nyear = 1\n", Some(existing))
            .unwrap();
        let keys: Vec<_> = bib.iter().map(Entry::key).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BibParser::new()
            .parse_bib(&[dir.path().join("nope.ini")], None)
            .unwrap_err();
        assert!(matches!(err, BibError::Read { .. }));
    }
}
