//! INI-style bibliography writer

use std::io::Write;

use tracing::debug;

use crate::bib::Bib;
use crate::entry::Entry;
use crate::error::{BibError, Result};

/// Writes a [`Bib`] as INI-style text: one `[key]` section per entry and one
/// `name = value` line per field.
///
/// Values are written raw. Multi-line values continue on tab-indented lines
/// (an empty value line becomes a bare tab), which [`super::BibParser`] reads
/// back as a single value. Whitespace at either end of a value line is not
/// preserved by the reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct BibWriter;

impl BibWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render the whole collection.
    ///
    /// Fails with [`BibError::DuplicateKey`] if two entries share a key;
    /// nothing is rendered in that case.
    pub fn format(&self, bib: &Bib) -> Result<String> {
        if let Some(key) = bib.duplicate_keys().first() {
            return Err(BibError::DuplicateKey(key.to_string()));
        }
        let mut out = String::new();
        for entry in bib {
            format_section(entry, &mut out);
        }
        debug!(sections = bib.len(), "Formatted INI output");
        Ok(out)
    }

    /// Render the collection and write it out. On a duplicate key nothing is
    /// written.
    pub fn write<W: Write>(&self, bib: &Bib, mut writer: W) -> Result<()> {
        let text = self.format(bib)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

fn format_section(entry: &Entry, out: &mut String) {
    out.push('[');
    out.push_str(entry.key());
    out.push_str("]\n");
    for field in entry.fields() {
        out.push_str(&field.name);
        out.push_str(" = ");
        out.push_str(&field.value.replace('\n', "\n\t"));
        out.push('\n');
    }
    out.push('\n');
}
