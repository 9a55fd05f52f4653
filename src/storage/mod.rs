//! Record storage subsystem
//!
//! The data file holds every catalog record ever created, as fixed-size,
//! checksummed slots addressed by byte offset.
//!
//! # Design Principles
//!
//! - Fixed-size records: in-place updates never move other records
//! - Checksum-verified on every read
//! - Soft deletion: tombstoned records stay on disk forever
//! - fsync after every write
//! - No duplicate-key checks here; callers consult the primary index first

mod checksum;
mod errors;
mod reader;
mod record;
mod store;

pub use checksum::compute_checksum;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::RecordScan;
pub use record::{
    MangaRecord, AUTHOR_CAPACITY, GENRE_CAPACITY, KEY_CAPACITY, MAGAZINE_CAPACITY, MAX_VOLUMES,
    ONGOING_YEAR, PUBLISHER_CAPACITY, RECORD_SIZE, TITLE_CAPACITY,
};
pub use store::RecordStore;
