//! Manga record type and its fixed on-disk layout
//!
//! Every record occupies exactly [`RECORD_SIZE`] bytes, so records can be
//! addressed by byte offset and overwritten in place without shifting
//! their neighbours:
//!
//! ```text
//! +--------------------+
//! | Key                | [u8; 20]  UTF-8, NUL padded
//! | Title              | [u8; 100]
//! | Author             | [u8; 100]
//! | Start Year         | i32 LE
//! | End Year           | i32 LE   (-1 = ongoing)
//! | Genre              | [u8; 50]
//! | Magazine           | [u8; 50]
//! | Publisher          | [u8; 50]
//! | Edition Year       | i32 LE
//! | Total Volumes      | u32 LE
//! | Acquired Volumes   | u32 LE
//! | Volume Numbers     | [u32 LE; 100] (first `acquired` meaningful)
//! | Tombstone Flag     | u8 (0 = live, 1 = deleted)
//! | Checksum           | u32 LE
//! +--------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use serde::{Deserialize, Serialize};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};

/// Byte capacity of the key field
pub const KEY_CAPACITY: usize = 20;
/// Byte capacity of the title field
pub const TITLE_CAPACITY: usize = 100;
/// Byte capacity of the author field
pub const AUTHOR_CAPACITY: usize = 100;
/// Byte capacity of the genre field
pub const GENRE_CAPACITY: usize = 50;
/// Byte capacity of the magazine field
pub const MAGAZINE_CAPACITY: usize = 50;
/// Byte capacity of the publisher field
pub const PUBLISHER_CAPACITY: usize = 50;
/// Maximum number of acquired volume numbers per record
pub const MAX_VOLUMES: usize = 100;

/// End-year value stored for series still in publication
pub const ONGOING_YEAR: i32 = -1;

const TOMBSTONE_OFFSET: usize = KEY_CAPACITY
    + TITLE_CAPACITY
    + AUTHOR_CAPACITY
    + 4
    + 4
    + GENRE_CAPACITY
    + MAGAZINE_CAPACITY
    + PUBLISHER_CAPACITY
    + 4
    + 4
    + 4
    + MAX_VOLUMES * 4;

const CHECKSUM_OFFSET: usize = TOMBSTONE_OFFSET + 1;

/// Size in bytes of one encoded record, checksum included
pub const RECORD_SIZE: usize = CHECKSUM_OFFSET + 4;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaRecord {
    /// Unique identifier (ISBN-like)
    pub key: String,
    pub title: String,
    pub author: String,
    pub start_year: i32,
    /// `None` while the series is still in publication
    pub end_year: Option<i32>,
    pub genre: String,
    pub magazine: String,
    pub publisher: String,
    pub edition_year: i32,
    /// Declared size of the whole series
    pub total_volumes: u32,
    /// Acquired volume numbers, in acquisition order
    pub volumes: Vec<u32>,
    /// Set once the record has been soft-deleted
    #[serde(default, skip_deserializing)]
    pub is_tombstone: bool,
}

impl MangaRecord {
    /// Number of acquired volumes
    pub fn acquired_volumes(&self) -> usize {
        self.volumes.len()
    }

    /// Whether the series is still in publication
    pub fn is_ongoing(&self) -> bool {
        self.end_year.is_none()
    }

    /// Checks every field against its fixed slot and basic sanity rules.
    pub fn validate(&self) -> StorageResult<()> {
        if self.key.trim().is_empty() {
            return Err(StorageError::invalid_record("key", "key must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(StorageError::invalid_record("title", "title must not be empty"));
        }

        let fields = [
            ("key", self.key.as_str(), KEY_CAPACITY),
            ("title", self.title.as_str(), TITLE_CAPACITY),
            ("author", self.author.as_str(), AUTHOR_CAPACITY),
            ("genre", self.genre.as_str(), GENRE_CAPACITY),
            ("magazine", self.magazine.as_str(), MAGAZINE_CAPACITY),
            ("publisher", self.publisher.as_str(), PUBLISHER_CAPACITY),
        ];
        for (name, value, capacity) in fields {
            check_text(name, value, capacity)?;
        }

        if self.volumes.len() > MAX_VOLUMES {
            return Err(StorageError::capacity_exceeded(
                "volumes",
                self.volumes.len(),
                MAX_VOLUMES,
            ));
        }

        if let Some(end) = self.end_year {
            if end == ONGOING_YEAR {
                return Err(StorageError::invalid_record(
                    "end_year",
                    "end year -1 is reserved for ongoing series",
                ));
            }
            if end < self.start_year {
                return Err(StorageError::invalid_record(
                    "end_year",
                    format!("end year {} precedes start year {}", end, self.start_year),
                ));
            }
        }

        Ok(())
    }

    /// Encodes the record into its fixed-size form.
    ///
    /// Fails with `MANGA_CAPACITY_EXCEEDED` or `MANGA_RECORD_INVALID` rather
    /// than truncating anything.
    pub fn encode(&self) -> StorageResult<Vec<u8>> {
        self.validate()?;

        let mut buf = Vec::with_capacity(RECORD_SIZE);
        put_text(&mut buf, &self.key, KEY_CAPACITY);
        put_text(&mut buf, &self.title, TITLE_CAPACITY);
        put_text(&mut buf, &self.author, AUTHOR_CAPACITY);
        buf.extend_from_slice(&self.start_year.to_le_bytes());
        buf.extend_from_slice(&self.end_year.unwrap_or(ONGOING_YEAR).to_le_bytes());
        put_text(&mut buf, &self.genre, GENRE_CAPACITY);
        put_text(&mut buf, &self.magazine, MAGAZINE_CAPACITY);
        put_text(&mut buf, &self.publisher, PUBLISHER_CAPACITY);
        buf.extend_from_slice(&self.edition_year.to_le_bytes());
        buf.extend_from_slice(&self.total_volumes.to_le_bytes());
        buf.extend_from_slice(&(self.volumes.len() as u32).to_le_bytes());
        for slot in 0..MAX_VOLUMES {
            let volume = self.volumes.get(slot).copied().unwrap_or(0);
            buf.extend_from_slice(&volume.to_le_bytes());
        }
        buf.push(u8::from(self.is_tombstone));

        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());

        debug_assert_eq!(buf.len(), RECORD_SIZE);
        Ok(buf)
    }

    /// Decodes one record, verifying its checksum.
    ///
    /// `offset` is only used to give corruption errors a location.
    pub fn decode(data: &[u8], offset: u64) -> StorageResult<Self> {
        if data.len() != RECORD_SIZE {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    RECORD_SIZE,
                    data.len()
                ),
            ));
        }

        let stored = u32::from_le_bytes([
            data[CHECKSUM_OFFSET],
            data[CHECKSUM_OFFSET + 1],
            data[CHECKSUM_OFFSET + 2],
            data[CHECKSUM_OFFSET + 3],
        ]);
        if !verify_checksum(&data[..CHECKSUM_OFFSET], stored) {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    compute_checksum(&data[..CHECKSUM_OFFSET]),
                    stored
                ),
            ));
        }

        let mut fields = FieldReader::new(&data[..CHECKSUM_OFFSET], offset);
        let key = fields.text(KEY_CAPACITY)?;
        let title = fields.text(TITLE_CAPACITY)?;
        let author = fields.text(AUTHOR_CAPACITY)?;
        let start_year = fields.i32();
        let end_year = match fields.i32() {
            ONGOING_YEAR => None,
            year => Some(year),
        };
        let genre = fields.text(GENRE_CAPACITY)?;
        let magazine = fields.text(MAGAZINE_CAPACITY)?;
        let publisher = fields.text(PUBLISHER_CAPACITY)?;
        let edition_year = fields.i32();
        let total_volumes = fields.u32();
        let acquired = fields.u32() as usize;
        if acquired > MAX_VOLUMES {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!("Acquired volume count {} exceeds {}", acquired, MAX_VOLUMES),
            ));
        }
        let slots: Vec<u32> = (0..MAX_VOLUMES).map(|_| fields.u32()).collect();
        let volumes = slots[..acquired].to_vec();
        let is_tombstone = match fields.u8() {
            0 => false,
            1 => true,
            other => {
                return Err(StorageError::corruption_at_offset(
                    offset,
                    format!("Invalid tombstone flag: {}", other),
                ))
            }
        };

        Ok(Self {
            key,
            title,
            author,
            start_year,
            end_year,
            genre,
            magazine,
            publisher,
            edition_year,
            total_volumes,
            volumes,
            is_tombstone,
        })
    }
}

fn check_text(field: &str, value: &str, capacity: usize) -> StorageResult<()> {
    if value.contains('\0') {
        return Err(StorageError::invalid_record(field, "NUL bytes are not allowed"));
    }
    if value.len() > capacity {
        return Err(StorageError::capacity_exceeded(field, value.len(), capacity));
    }
    Ok(())
}

fn put_text(buf: &mut Vec<u8>, value: &str, capacity: usize) {
    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + capacity - value.len(), 0);
}

/// Sequential reader over the fields of one checksum-verified record.
struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
    offset: u64,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8], offset: u64) -> Self {
        Self {
            data,
            pos: 0,
            offset,
        }
    }

    fn take(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    fn text(&mut self, capacity: usize) -> StorageResult<String> {
        let raw = self.take(capacity);
        let end = raw.iter().position(|&b| b == 0).unwrap_or(capacity);
        String::from_utf8(raw[..end].to_vec()).map_err(|e| {
            StorageError::corruption_at_offset(self.offset, format!("Invalid UTF-8: {}", e))
        })
    }

    fn i32(&mut self) -> i32 {
        let raw = self.take(4);
        i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])
    }

    fn u32(&mut self) -> u32 {
        let raw = self.take(4);
        u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }
}
