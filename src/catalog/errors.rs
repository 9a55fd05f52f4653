//! Catalog error taxonomy
//!
//! Every failure the catalog reports to its caller carries one of these
//! codes. Lower layers (record store, indexes, import parser) keep their own
//! finer-grained codes; the `From` impls fold them into this set.
//!
//! Error codes:
//! - MANGA_NOT_FOUND (ERROR)
//! - MANGA_DUPLICATE_KEY (ERROR)
//! - MANGA_IO_FAILURE (ERROR)
//! - MANGA_VALIDATION_FAILED (ERROR)
//! - MANGA_CAPACITY_EXCEEDED (ERROR)
//! - MANGA_AMBIGUOUS (ERROR)
//! - MANGA_CONFIG_INVALID (ERROR)
//! - MANGA_DATA_CORRUPTION (FATAL)

use std::error::Error as StdError;
use std::fmt;

use crate::import::ImportError;
use crate::index::{IndexError, IndexErrorCode};
use crate::query::Candidate;
use crate::storage::{StorageError, StorageErrorCode};

/// Severity levels for catalog errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation failed; the catalog is still usable
    Error,
    /// Persisted state can no longer be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Catalog error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Key, title or offset has no active record
    NotFound,
    /// Create with a key that is already indexed
    DuplicateKey,
    /// Open, read or write failure on one of the catalog files
    IoFailure,
    /// Malformed or incomplete input record
    ValidationFailure,
    /// String or volume list longer than its fixed bound
    CapacityExceeded,
    /// A search term matched several records
    Ambiguous,
    /// Configuration file missing, unreadable or invalid
    ConfigInvalid,
    /// Data or index file failed integrity checks
    DataCorruption,
}

impl CatalogErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::NotFound => "MANGA_NOT_FOUND",
            CatalogErrorCode::DuplicateKey => "MANGA_DUPLICATE_KEY",
            CatalogErrorCode::IoFailure => "MANGA_IO_FAILURE",
            CatalogErrorCode::ValidationFailure => "MANGA_VALIDATION_FAILED",
            CatalogErrorCode::CapacityExceeded => "MANGA_CAPACITY_EXCEEDED",
            CatalogErrorCode::Ambiguous => "MANGA_AMBIGUOUS",
            CatalogErrorCode::ConfigInvalid => "MANGA_CONFIG_INVALID",
            CatalogErrorCode::DataCorruption => "MANGA_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            CatalogErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with full context
#[derive(Debug)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
    /// Candidate matches, only for `Ambiguous`
    candidates: Vec<Candidate>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CatalogError {
    fn new(code: CatalogErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            candidates: Vec::new(),
            source: None,
        }
    }

    fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// No active record for a key
    pub fn not_found(key: &str) -> Self {
        Self::new(CatalogErrorCode::NotFound, format!("No record with key {}", key))
    }

    /// No record matches a search term
    pub fn no_match(term: &str) -> Self {
        Self::new(
            CatalogErrorCode::NotFound,
            format!("No record matches '{}'", term),
        )
    }

    /// Key already in the catalog
    pub fn duplicate_key(key: &str) -> Self {
        Self::new(
            CatalogErrorCode::DuplicateKey,
            format!("Key already exists: {}", key),
        )
    }

    /// Input record rejected
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorCode::ValidationFailure, message)
    }

    /// Several records match a search term
    pub fn ambiguous(term: &str, candidates: Vec<Candidate>) -> Self {
        let mut err = Self::new(
            CatalogErrorCode::Ambiguous,
            format!("'{}' matches {} records", term, candidates.len()),
        );
        err.candidates = candidates;
        err
    }

    /// Primary index points at a record carrying a different key
    pub fn index_mismatch(key: &str, offset: u64, found: &str) -> Self {
        Self::new(
            CatalogErrorCode::DataCorruption,
            format!(
                "Primary index maps {} to offset {}, which holds {}",
                key, offset, found
            ),
        )
    }

    /// Configuration rejected
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorCode::ConfigInvalid, message)
    }

    /// File system failure outside the storage and index layers
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::new(CatalogErrorCode::IoFailure, message).with_source(source)
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Candidate matches carried by an `Ambiguous` error
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl StdError for CatalogError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        let code = match err.code() {
            StorageErrorCode::StorageIoError
            | StorageErrorCode::StorageWriteFailed
            | StorageErrorCode::StorageReadFailed => CatalogErrorCode::IoFailure,
            StorageErrorCode::RecordNotFound => CatalogErrorCode::NotFound,
            StorageErrorCode::RecordInvalid => CatalogErrorCode::ValidationFailure,
            StorageErrorCode::CapacityExceeded => CatalogErrorCode::CapacityExceeded,
            StorageErrorCode::DataCorruption => CatalogErrorCode::DataCorruption,
        };
        let message = match err.details() {
            Some(details) => format!("{} ({})", err.message(), details),
            None => err.message().to_string(),
        };
        Self::new(code, message).with_source(err)
    }
}

impl From<IndexError> for CatalogError {
    fn from(err: IndexError) -> Self {
        let code = match err.code() {
            IndexErrorCode::IndexDuplicateKey => CatalogErrorCode::DuplicateKey,
            IndexErrorCode::IndexEntryTooLarge => CatalogErrorCode::CapacityExceeded,
            IndexErrorCode::IndexPersistFailed | IndexErrorCode::IndexLoadFailed => {
                CatalogErrorCode::IoFailure
            }
            IndexErrorCode::IndexCorruption => CatalogErrorCode::DataCorruption,
        };
        let message = err.message().to_string();
        Self::new(code, message).with_source(err)
    }
}

impl From<ImportError> for CatalogError {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        Self::new(CatalogErrorCode::ValidationFailure, message).with_source(err)
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
