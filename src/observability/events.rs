//! Observable catalog events
//!
//! Events are explicit and typed; their string form is what appears in the
//! `event` field of each log line.

use std::fmt;

/// Observable events in the catalog lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Catalog files opened and indexes loaded
    CatalogOpen,
    /// Catalog shut down after a final index persist
    CatalogClose,

    // Indexes
    /// Index file loaded
    IndexLoad,
    /// Index file could not be opened; starting empty
    IndexOpenFailed,
    /// Index file written
    IndexPersist,
    /// Indexes re-derived from the data file
    IndexRebuild,

    // Mutations
    /// Record appended and indexed
    RecordCreate,
    /// Record overwritten in place
    RecordUpdate,
    /// Record tombstoned and unindexed
    RecordDelete,

    // Queries
    /// Search term resolved
    QueryResolved,

    // Bulk import
    /// Import batch begins
    ImportStart,
    /// One input line rejected
    ImportLineSkipped,
    /// Import batch finished
    ImportComplete,

    /// Checksum failure or torn file (FATAL)
    DataCorruption,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogOpen => "CATALOG_OPEN",
            Event::CatalogClose => "CATALOG_CLOSE",
            Event::IndexLoad => "INDEX_LOADED",
            Event::IndexOpenFailed => "INDEX_OPEN_FAILED",
            Event::IndexPersist => "INDEX_PERSISTED",
            Event::IndexRebuild => "INDEX_REBUILT",
            Event::RecordCreate => "RECORD_CREATED",
            Event::RecordUpdate => "RECORD_UPDATED",
            Event::RecordDelete => "RECORD_DELETED",
            Event::QueryResolved => "QUERY_RESOLVED",
            Event::ImportStart => "IMPORT_BEGIN",
            Event::ImportLineSkipped => "IMPORT_LINE_SKIPPED",
            Event::ImportComplete => "IMPORT_COMPLETE",
            Event::DataCorruption => "DATA_CORRUPTION",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::DataCorruption)
    }

    /// Returns true for events that signal a recoverable problem
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::IndexOpenFailed | Event::ImportLineSkipped)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
