//! Error types for bibrec

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for bibrec operations
pub type Result<T> = std::result::Result<T, BibError>;

/// Main error type for bibrec operations
#[derive(Error, Debug)]
pub enum BibError {
    /// A derived value could not be computed from an entry's fields
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Two entries share a citation key, which the INI output cannot represent
    #[error("Conflict: duplicate entry key '{0}'")]
    DuplicateKey(String),

    /// Malformed INI-style input
    #[error("{source_name}, line {line}: {message}")]
    IniSyntax {
        source_name: String,
        line: usize,
        message: String,
    },

    /// A named source could not be read
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while deriving a publication date from an entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("entry '{key}' has no year")]
    MissingYear { key: String },

    #[error("entry '{key}' has an unrecognized date '{month} {year}'")]
    UnrecognizedDate {
        key: String,
        month: String,
        year: String,
    },
}

impl BibError {
    pub(crate) fn ini_syntax(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        BibError::IniSyntax {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}
