//! Bibliography records
//!
//! This crate reads bibliographic entries from a line-oriented BibTeX-like
//! format and from an INI-style format, keeps them in an ordered collection
//! that can be sorted by publication date, and writes the collection back out
//! as INI-style text.
//!
//! Features:
//! - Line classifier and accumulator parser for BibTeX-like input
//! - Value normalization (brace/quote stripping, `\&` unescaping, `%` doubling)
//! - Absent-safe field lookups and derived publication dates
//! - INI-style reader and writer that round-trip each other
//!
//! ```
//! use bibrec::{Bib, BibTexParser, BibWriter};
//!
//! let mut bib = Bib::new();
//! let mut parser = BibTexParser::new();
//! parser.parse_str("refs.bib", "@article{doe2020,\nyear = {2020},\n}\n", &mut bib);
//!
//! let ini = BibWriter::new().format(&bib)?;
//! assert_eq!(ini, "[doe2020]\nyear = 2020\n\n");
//! # Ok::<(), bibrec::BibError>(())
//! ```

mod bib;
pub mod bibtex_parser;
pub mod classify;
pub mod config;
mod entry;
mod error;
pub mod escape;
pub mod ini;

pub use bib::Bib;
pub use bibtex_parser::{BibTexParser, ParseReport, SkippedLine};
pub use classify::{classify, LineKind};
pub use config::Config;
pub use entry::{parse_month_year, Entry, EntryField, DEFAULT_MONTH, KEY_FIELD};
pub use error::{BibError, FormatError, Result};
pub use ini::{BibParser, BibWriter};
