//! Record store error types
//!
//! Error codes:
//! - MANGA_STORAGE_IO_ERROR (ERROR severity)
//! - MANGA_STORAGE_WRITE_FAILED (ERROR severity)
//! - MANGA_STORAGE_READ_FAILED (ERROR severity)
//! - MANGA_RECORD_NOT_FOUND (ERROR severity)
//! - MANGA_RECORD_INVALID (ERROR severity)
//! - MANGA_CAPACITY_EXCEEDED (ERROR severity)
//! - MANGA_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, catalog stays usable
    Error,
    /// The data file can no longer be trusted
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

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure while opening the data file
    StorageIoError,
    /// Record append or overwrite failed
    StorageWriteFailed,
    /// Record read failed
    StorageReadFailed,
    /// No record lives at the requested offset
    RecordNotFound,
    /// Record content is malformed (empty key, NUL bytes, bad years)
    RecordInvalid,
    /// A string or the volume list does not fit its fixed slot
    CapacityExceeded,
    /// Checksum failure or torn data file
    DataCorruption,
}

impl StorageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageIoError => "MANGA_STORAGE_IO_ERROR",
            StorageErrorCode::StorageWriteFailed => "MANGA_STORAGE_WRITE_FAILED",
            StorageErrorCode::StorageReadFailed => "MANGA_STORAGE_READ_FAILED",
            StorageErrorCode::RecordNotFound => "MANGA_RECORD_NOT_FOUND",
            StorageErrorCode::RecordInvalid => "MANGA_RECORD_INVALID",
            StorageErrorCode::CapacityExceeded => "MANGA_CAPACITY_EXCEEDED",
            StorageErrorCode::DataCorruption => "MANGA_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    fn with_source(mut self, source: io::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::StorageIoError, message).with_source(source)
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::StorageWriteFailed, message).with_source(source)
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::StorageReadFailed, message).with_source(source)
    }

    /// No record at the given offset (unaligned or past end of file)
    pub fn record_not_found(offset: u64) -> Self {
        Self::new(StorageErrorCode::RecordNotFound, "No record at specified offset")
            .with_details(format!("byte_offset: {}", offset))
    }

    /// Record failed field validation
    pub fn invalid_record(field: &str, reason: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::RecordInvalid, reason).with_details(format!("field: {}", field))
    }

    /// Field content longer than its fixed capacity
    pub fn capacity_exceeded(field: &str, len: usize, capacity: usize) -> Self {
        Self::new(
            StorageErrorCode::CapacityExceeded,
            format!("{} bytes exceed capacity of {}", len, capacity),
        )
        .with_details(format!("field: {}", field))
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::DataCorruption, reason)
            .with_details(format!("byte_offset: {}", offset))
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
