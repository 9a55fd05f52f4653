//! CLI-specific error types
//!
//! Catalog errors pass through with their own code; everything else the
//! CLI itself can get wrong has a `MANGA_CLI_*` code.

use std::fmt;
use std::io;

use crate::catalog::CatalogError;
use crate::query::Candidate;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// I/O error (stdin/stdout, import file)
    IoError,
    /// Request body is not what the command expects
    BadInput,
    /// Data directory already initialized
    AlreadyInitialized,
    /// Data directory not initialized
    NotInitialized,
    /// Error raised by the catalog, carrying its own code
    Catalog(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "MANGA_CLI_IO_ERROR",
            Self::BadInput => "MANGA_CLI_BAD_INPUT",
            Self::AlreadyInitialized => "MANGA_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "MANGA_CLI_NOT_INITIALIZED",
            Self::Catalog(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    fatal: bool,
    candidates: Vec<Candidate>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fatal: false,
            candidates: Vec::new(),
        }
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed request body
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadInput, msg)
    }

    /// Already initialized
    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    /// Not initialized
    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'mangastore init' first.",
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the underlying failure was fatal
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Candidates of an ambiguous search
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::bad_input(format!("JSON error: {}", e))
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self {
            code: CliErrorCode::Catalog(e.code().code()),
            message: e.message().to_string(),
            fatal: e.is_fatal(),
            candidates: e.candidates().to_vec(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_code_passes_through() {
        let err: CliError = CatalogError::not_found("k1").into();
        assert_eq!(err.code_str(), "MANGA_NOT_FOUND");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_json_error_is_bad_input() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = json_err.into();
        assert_eq!(err.code(), &CliErrorCode::BadInput);
    }

    #[test]
    fn test_display() {
        let err = CliError::not_initialized();
        assert!(err.to_string().starts_with("MANGA_CLI_NOT_INITIALIZED: "));
    }
}
