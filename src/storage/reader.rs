//! Sequential scan over the data file
//!
//! Each scan opens its own handle and starts at offset 0, so scans are
//! restartable and never disturb the store's read/write handle. Every
//! record read is checksum-verified; the first failure ends the scan.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{MangaRecord, RECORD_SIZE};

/// Lazy iterator over `(offset, record)` for every active record, in
/// storage (insertion) order.
pub struct RecordScan {
    /// Buffered reader
    reader: BufReader<File>,
    /// Offset of the next record to read
    current_offset: u64,
    /// File size when the scan started
    file_size: u64,
    /// Whether tombstoned records are yielded too
    include_tombstones: bool,
    /// Set after the end or after the first error
    finished: bool,
}

impl RecordScan {
    /// Opens the data file for a scan from the beginning.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open data file: {}", path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read data file metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
            include_tombstones: false,
            finished: false,
        })
    }

    /// Also yield soft-deleted records.
    #[cfg(test)]
    pub(crate) fn with_tombstones(mut self) -> Self {
        self.include_tombstones = true;
        self
    }

    /// Reads the next record regardless of its tombstone flag.
    fn read_next(&mut self) -> StorageResult<Option<(u64, MangaRecord)>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let offset = self.current_offset;
        let remaining = self.file_size - offset;
        if remaining < RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Truncated data file: {} bytes remaining, record size is {}",
                    remaining, RECORD_SIZE
                ),
            ));
        }

        let mut buf = vec![0u8; RECORD_SIZE];
        self.reader.read_exact(&mut buf).map_err(|e| {
            StorageError::read_failed(format!("Failed to read record at offset {}", offset), e)
        })?;
        self.current_offset += RECORD_SIZE as u64;

        let record = MangaRecord::decode(&buf, offset)?;
        Ok(Some((offset, record)))
    }
}

impl Iterator for RecordScan {
    type Item = StorageResult<(u64, MangaRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.read_next() {
                Ok(Some((_, record))) if record.is_tombstone && !self.include_tombstones => {
                    continue
                }
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
