use crate::diagnostic::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for textinc operations
#[derive(Error, Debug)]
pub enum TextincError {
    /// Root or nested file could not be opened for reading
    #[error("Cannot open input file {path}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination could not be created or truncated
    #[error("Cannot open output file {path}: {source}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Include directive whose name was found neither locally nor on the search path
    #[error("{0}")]
    UnresolvedInclude(Diagnostic),

    /// A file includes itself, directly or through other files
    #[error("Circular include of {path}: {}", format_chain(.chain))]
    CircularInclude { path: PathBuf, chain: Vec<PathBuf> },

    /// Custom directive marker did not compile
    #[error("Invalid directive syntax: {0}")]
    InvalidSyntax(#[from] regex::Error),

    /// IO error while reading or writing mid-stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TextincError {
    /// Diagnostic carried by an unresolved include, if this is one.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::UnresolvedInclude(diag) => Some(diag),
            _ => None,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, TextincError>;
