//! Index error types
//!
//! Error codes:
//! - MANGA_INDEX_DUPLICATE_KEY (ERROR)
//! - MANGA_INDEX_ENTRY_TOO_LARGE (ERROR)
//! - MANGA_INDEX_PERSIST_FAILED (ERROR)
//! - MANGA_INDEX_LOAD_FAILED (ERROR)
//! - MANGA_INDEX_CORRUPTION (FATAL)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed, in-memory index unchanged
    Error,
    /// Index file cannot be trusted
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

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Key (or title/key pair) already indexed
    IndexDuplicateKey,
    /// Entry text longer than its fixed on-disk width
    IndexEntryTooLarge,
    /// Writing an index file failed
    IndexPersistFailed,
    /// Reading an opened index file failed
    IndexLoadFailed,
    /// Index file is truncated or malformed
    IndexCorruption,
}

impl IndexErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::IndexDuplicateKey => "MANGA_INDEX_DUPLICATE_KEY",
            IndexErrorCode::IndexEntryTooLarge => "MANGA_INDEX_ENTRY_TOO_LARGE",
            IndexErrorCode::IndexPersistFailed => "MANGA_INDEX_PERSIST_FAILED",
            IndexErrorCode::IndexLoadFailed => "MANGA_INDEX_LOAD_FAILED",
            IndexErrorCode::IndexCorruption => "MANGA_INDEX_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::IndexCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl IndexError {
    /// Key already present in the index
    pub fn duplicate_key(key: &str) -> Self {
        Self {
            code: IndexErrorCode::IndexDuplicateKey,
            message: format!("Key already indexed: {}", key),
            source: None,
        }
    }

    /// Entry field too wide for the index file layout
    pub fn entry_too_large(field: &str, len: usize, capacity: usize) -> Self {
        Self {
            code: IndexErrorCode::IndexEntryTooLarge,
            message: format!("{} is {} bytes, index slot holds {}", field, len, capacity),
            source: None,
        }
    }

    /// Writing an index file failed
    pub fn persist_failed(path: &Path, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::IndexPersistFailed,
            message: format!("Failed to persist index file: {}", path.display()),
            source: Some(source),
        }
    }

    /// Reading an index file failed after it was opened
    pub fn load_failed(path: &Path, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::IndexLoadFailed,
            message: format!("Failed to read index file: {}", path.display()),
            source: Some(source),
        }
    }

    /// Index file content is malformed
    pub fn corruption(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::IndexCorruption,
            message: format!("Index file {} is corrupt: {}", path.display(), reason.into()),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
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

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(IndexErrorCode::IndexDuplicateKey.code(), "MANGA_INDEX_DUPLICATE_KEY");
        assert_eq!(IndexErrorCode::IndexPersistFailed.code(), "MANGA_INDEX_PERSIST_FAILED");
        assert_eq!(IndexErrorCode::IndexCorruption.code(), "MANGA_INDEX_CORRUPTION");
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(IndexError::corruption(Path::new("primary_index.dat"), "short").is_fatal());
        assert!(!IndexError::duplicate_key("k1").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::corruption(Path::new("secondary_index.dat"), "negative entry count");
        let display = format!("{}", err);
        assert!(display.contains("MANGA_INDEX_CORRUPTION"));
        assert!(display.contains("FATAL"));
        assert!(display.contains("secondary_index.dat"));
    }
}
