//! Offset-addressed record store
//!
//! The data file is a flat sequence of fixed-size records. Records are
//! appended at the end, overwritten in place, and never physically removed:
//! deletion only flips the tombstone flag.
//!
//! Every write is followed by fsync before it is acknowledged.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::reader::RecordScan;
use super::record::{MangaRecord, RECORD_SIZE};

/// Single-owner handle on the data file.
pub struct RecordStore {
    /// Path to the data file
    path: PathBuf,
    /// Read/write handle (not opened in append mode so in-place updates work)
    file: File,
    /// Current file length in bytes, always a multiple of RECORD_SIZE
    len: u64,
}

impl RecordStore {
    /// Opens or creates the data file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// - `MANGA_STORAGE_IO_ERROR` if the file cannot be created or opened
    /// - `MANGA_DATA_CORRUPTION` if the file ends with a partial record
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::io_error(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                StorageError::io_error(
                    format!("Failed to open data file: {}", path.display()),
                    e,
                )
            })?;

        let len = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read data file metadata", e))?
            .len();

        let torn = len % RECORD_SIZE as u64;
        if torn != 0 {
            return Err(StorageError::corruption_at_offset(
                len - torn,
                format!("Torn record at end of data file: {} trailing bytes", torn),
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    /// Returns the path to the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the offset the next append will use.
    pub fn end_offset(&self) -> u64 {
        self.len
    }

    /// Number of records in the file, tombstoned ones included.
    pub fn record_count(&self) -> u64 {
        self.len / RECORD_SIZE as u64
    }

    /// Appends a record and returns its byte offset.
    ///
    /// Duplicate keys are not checked here.
    pub fn append(&mut self, record: &MangaRecord) -> StorageResult<u64> {
        let bytes = record.encode()?;
        let offset = self.len;

        if let Err(e) = self.write_at(offset, &bytes) {
            // Drop any partially written tail so later offsets stay aligned.
            let _ = self.file.set_len(offset);
            return Err(e);
        }

        self.len += bytes.len() as u64;
        Ok(offset)
    }

    /// Reads exactly one record at `offset`, tombstoned or not.
    pub fn read(&self, offset: u64) -> StorageResult<MangaRecord> {
        self.check_offset(offset)?;

        let mut buf = vec![0u8; RECORD_SIZE];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset)).map_err(|e| {
            StorageError::read_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        file.read_exact(&mut buf).map_err(|e| {
            StorageError::read_failed(format!("Failed to read record at offset {}", offset), e)
        })?;

        MangaRecord::decode(&buf, offset)
    }

    /// Overwrites the record at `offset` with the full replacement `record`.
    pub fn update(&mut self, offset: u64, record: &MangaRecord) -> StorageResult<()> {
        self.check_offset(offset)?;
        let bytes = record.encode()?;
        self.write_at(offset, &bytes)
    }

    /// Sets the tombstone flag of the record at `offset` and writes it back.
    ///
    /// Returns the record as it now stands on disk.
    pub fn soft_delete(&mut self, offset: u64) -> StorageResult<MangaRecord> {
        let mut record = self.read(offset)?;
        record.is_tombstone = true;
        self.update(offset, &record)?;
        Ok(record)
    }

    /// Starts a fresh sequential scan over all active records.
    pub fn scan(&self) -> StorageResult<RecordScan> {
        RecordScan::open(&self.path)
    }

    fn check_offset(&self, offset: u64) -> StorageResult<()> {
        let aligned = offset % RECORD_SIZE as u64 == 0;
        let in_bounds = offset
            .checked_add(RECORD_SIZE as u64)
            .is_some_and(|end| end <= self.len);
        if aligned && in_bounds {
            Ok(())
        } else {
            Err(StorageError::record_not_found(offset))
        }
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> StorageResult<()> {
        self.file.seek(SeekFrom::Start(offset)).map_err(|e| {
            StorageError::write_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        self.file.write_all(bytes).map_err(|e| {
            StorageError::write_failed(format!("Failed to write record at offset {}", offset), e)
        })?;
        self.file.sync_all().map_err(|e| {
            StorageError::write_failed(format!("fsync failed after writing offset {}", offset), e)
        })
    }
}
