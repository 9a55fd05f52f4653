//! # Import Errors

use thiserror::Error;

/// Result type for line parsing
pub type ImportResult<T> = Result<T, ImportError>;

/// A single import line that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("line {line}: missing field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: expected at most 12 fields, found {found}")]
    TooManyFields { line: usize, found: usize },

    #[error("line {line}: field '{field}' is not a valid number: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: malformed volume list: {reason}")]
    InvalidVolumeList { line: usize, reason: String },

    #[error("line {line}: {declared} volumes declared acquired but {listed} listed")]
    VolumeCountMismatch {
        line: usize,
        declared: usize,
        listed: usize,
    },
}

impl ImportError {
    /// 1-based line number the error refers to
    pub fn line(&self) -> usize {
        match self {
            ImportError::MissingField { line, .. }
            | ImportError::TooManyFields { line, .. }
            | ImportError::InvalidNumber { line, .. }
            | ImportError::InvalidVolumeList { line, .. }
            | ImportError::VolumeCountMismatch { line, .. } => *line,
        }
    }
}
