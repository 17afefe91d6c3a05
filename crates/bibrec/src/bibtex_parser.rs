//! BibTeX-like line parser
//!
//! A deliberately small, line-oriented reader: one field per line, no
//! multi-line values, no nested braces beyond one layer, no comment entries.
//! Each line is classified and folded into an explicit open/closed state;
//! the entry being filled is always the last one appended by this parse.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::bib::Bib;
use crate::classify::{classify, LineKind};
use crate::config::ParseConfig;
use crate::entry::Entry;
use crate::error::{BibError, Result};
use crate::escape::normalize_value;

/// Whether field lines currently have an entry to land in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Closed,
    Open,
}

/// A source line the parser did not store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub source: String,
    /// 1-based line number within the source
    pub line: usize,
    pub text: String,
}

/// Diagnostics collected while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Entries started across all sources
    pub entries: usize,
    /// Lines matching none of the recognized shapes
    pub unrecognized: Vec<SkippedLine>,
    /// Field lines seen while no entry was open
    pub orphaned_fields: Vec<SkippedLine>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.unrecognized.is_empty() && self.orphaned_fields.is_empty()
    }
}

/// Parser for the BibTeX-like format
#[derive(Debug, Default)]
pub struct BibTexParser {
    config: ParseConfig,
    report: ParseReport,
}

impl BibTexParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self {
            config,
            report: ParseReport::default(),
        }
    }

    /// Diagnostics accumulated by every parse so far
    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    /// Hand back the accumulated diagnostics and start a fresh report
    pub fn take_report(&mut self) -> ParseReport {
        std::mem::take(&mut self.report)
    }

    /// Parse files in order into one collection.
    ///
    /// If `append_to` is given, entries are appended to it; otherwise a new
    /// collection is created. Each file is read completely before parsing.
    /// The files are treated as one stream: an entry still open at the end of
    /// a file keeps receiving fields from the next file until it is closed.
    pub fn parse_bib<P: AsRef<Path>>(&mut self, filenames: &[P], append_to: Option<Bib>) -> Result<Bib> {
        let mut bib = append_to.unwrap_or_default();
        let mut state = EntryState::Closed;
        for filename in filenames {
            let path = filename.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| BibError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            state = self.read_source(
                state,
                &path.display().to_string(),
                text.split_inclusive('\n'),
                &mut bib,
            );
        }
        if state == EntryState::Open {
            debug!("Input ended inside an entry");
        }
        Ok(bib)
    }

    /// Parse one named in-memory source, appending to `bib`
    pub fn parse_str(&mut self, source: &str, text: &str, bib: &mut Bib) {
        self.parse_lines(source, text.split_inclusive('\n'), bib);
    }

    /// Parse one named source given as lines, appending to `bib`.
    ///
    /// Lines may keep their terminators. Each call starts with no entry open;
    /// use [`BibTexParser::parse_bib`] to continue an entry across files.
    pub fn parse_lines<I>(&mut self, source: &str, lines: I, bib: &mut Bib)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.read_source(EntryState::Closed, source, lines, bib) == EntryState::Open {
            debug!(source, "Source ended inside an entry");
        }
    }

    fn read_source<I>(&mut self, state: EntryState, source: &str, lines: I, bib: &mut Bib) -> EntryState
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let before = bib.len();
        let final_state = lines
            .into_iter()
            .enumerate()
            .fold(state, |state, (idx, line)| {
                self.step(state, source, idx + 1, line.as_ref(), bib)
            });
        info!(source, entries = bib.len() - before, "Parsed BibTeX source");
        final_state
    }

    fn step(
        &mut self,
        state: EntryState,
        source: &str,
        line_no: usize,
        line: &str,
        bib: &mut Bib,
    ) -> EntryState {
        match (state, classify(line)) {
            (_, LineKind::Blank) => state,
            (_, LineKind::EntryStart { key }) => {
                bib.push(Entry::new(key));
                self.report.entries += 1;
                EntryState::Open
            }
            (EntryState::Open, LineKind::Field { name, raw_value }) => {
                if let (Some(value), Some(entry)) = (normalize_value(raw_value), bib.last_mut()) {
                    entry.set(name, value);
                }
                EntryState::Open
            }
            (EntryState::Closed, LineKind::Field { name, .. }) => {
                debug!(source, line = line_no, field = name, "Field outside of any entry");
                self.report.orphaned_fields.push(skipped(source, line_no, line));
                EntryState::Closed
            }
            (_, LineKind::EntryEnd) => EntryState::Closed,
            (_, LineKind::Unrecognized) => {
                if self.config.warn_unrecognized {
                    warn!(source, line = line_no, text = line.trim_end(), "Unrecognized line");
                } else {
                    debug!(source, line = line_no, text = line.trim_end(), "Unrecognized line");
                }
                self.report.unrecognized.push(skipped(source, line_no, line));
                state
            }
        }
    }
}

fn skipped(source: &str, line: usize, text: &str) -> SkippedLine {
    SkippedLine {
        source: source.to_string(),
        line,
        text: text.trim_end_matches(['\n', '\r']).to_string(),
    }
}
