//! Error types shared by the solver library.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    /// Empty city set, zero-sized tour, mismatched tour, or bad annealing parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The city source could not be opened or read
    #[error("cannot read cities from {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a report, CSV file or SVG failed
    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn source_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }
}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        SolverError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(e: serde_json::Error) -> Self {
        SolverError::Export(e.to_string())
    }
}
