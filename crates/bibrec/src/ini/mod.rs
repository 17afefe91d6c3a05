//! INI-style bibliography format
//!
//! Reading and writing are symmetric: text written by [`BibWriter`] reads
//! back through [`BibParser`] into the same sections and fields, in order.

mod reader;
mod writer;

pub use reader::BibParser;
pub use writer::BibWriter;
