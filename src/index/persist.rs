//! Index file codec
//!
//! Both index files share one layout:
//!
//! ```text
//! +-----------------------+
//! | Entry Count (i32 LE)  |
//! +-----------------------+
//! | Entry 0 (fixed width) |
//! | ...                   |
//! +-----------------------+
//! ```
//!
//! Text fields are UTF-8, NUL padded to their slot width. Files are
//! replaced whole: write to `<name>.tmp`, fsync, rename, fsync directory.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use super::errors::{IndexError, IndexResult};
use crate::observability::{log_event_with_fields, Event};

/// A fixed-width index entry that can be written to and read from an index file.
pub(crate) trait IndexEntry: Sized {
    /// Encoded width of one entry in bytes
    const ENCODED_SIZE: usize;

    /// Appends exactly `ENCODED_SIZE` bytes to `buf`.
    fn encode_into(&self, buf: &mut Vec<u8>) -> IndexResult<()>;

    /// Decodes one entry from exactly `ENCODED_SIZE` bytes.
    fn decode_from(raw: &[u8], path: &Path) -> IndexResult<Self>;
}

/// Writes `value` into a NUL-padded slot of `capacity` bytes.
pub(crate) fn put_fixed(
    buf: &mut Vec<u8>,
    field: &str,
    value: &str,
    capacity: usize,
) -> IndexResult<()> {
    if value.len() > capacity {
        return Err(IndexError::entry_too_large(field, value.len(), capacity));
    }
    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + capacity - value.len(), 0);
    Ok(())
}

/// Reads a NUL-padded UTF-8 slot.
pub(crate) fn get_fixed(raw: &[u8], path: &Path) -> IndexResult<String> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8(raw[..end].to_vec())
        .map_err(|e| IndexError::corruption(path, format!("invalid UTF-8: {}", e)))
}

/// Replaces the index file at `path` with `entries`.
pub(crate) fn persist_entries<E: IndexEntry>(path: &Path, entries: &[E]) -> IndexResult<()> {
    let count = i32::try_from(entries.len())
        .map_err(|_| IndexError::entry_too_large("entry count", entries.len(), i32::MAX as usize))?;

    let mut buf = Vec::with_capacity(4 + entries.len() * E::ENCODED_SIZE);
    buf.extend_from_slice(&count.to_le_bytes());
    for entry in entries {
        entry.encode_into(&mut buf)?;
    }

    write_replacing(path, &buf)?;

    log_event_with_fields(
        Event::IndexPersist,
        &[
            ("entries", &entries.len().to_string()),
            ("path", &path.display().to_string()),
        ],
    );
    Ok(())
}

/// Loads all entries from the index file at `path`.
///
/// A file that cannot be opened yields an empty index (first run). A file
/// that opens but does not decode is corruption.
pub(crate) fn load_entries<E: IndexEntry>(path: &Path) -> IndexResult<Vec<E>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                log_event_with_fields(
                    Event::IndexOpenFailed,
                    &[
                        ("error", &e.to_string()),
                        ("path", &path.display().to_string()),
                    ],
                );
            }
            return Ok(Vec::new());
        }
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IndexError::load_failed(path, e))?;

    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.len() < 4 {
        return Err(IndexError::corruption(path, "missing entry count header"));
    }

    let count = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if count < 0 {
        return Err(IndexError::corruption(
            path,
            format!("negative entry count {}", count),
        ));
    }

    let body = &bytes[4..];
    let expected = count as usize * E::ENCODED_SIZE;
    if body.len() != expected {
        return Err(IndexError::corruption(
            path,
            format!(
                "{} entries need {} bytes, found {}",
                count,
                expected,
                body.len()
            ),
        ));
    }

    let entries = body
        .chunks_exact(E::ENCODED_SIZE)
        .map(|raw| E::decode_from(raw, path))
        .collect::<IndexResult<Vec<E>>>()?;

    log_event_with_fields(
        Event::IndexLoad,
        &[
            ("entries", &entries.len().to_string()),
            ("path", &path.display().to_string()),
        ],
    );
    Ok(entries)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_replacing(path: &Path, bytes: &[u8]) -> IndexResult<()> {
    let tmp = tmp_path(path);

    let mut file = File::create(&tmp).map_err(|e| IndexError::persist_failed(&tmp, e))?;
    file.write_all(bytes)
        .map_err(|e| IndexError::persist_failed(&tmp, e))?;
    file.sync_all()
        .map_err(|e| IndexError::persist_failed(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| IndexError::persist_failed(path, e))?;

    // fsync parent directory so the rename itself is durable
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = OpenOptions::new()
            .read(true)
            .open(parent)
            .map_err(|e| IndexError::persist_failed(parent, e))?;
        dir.sync_all()
            .map_err(|e| IndexError::persist_failed(parent, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq)]
    struct Tag(String);

    impl IndexEntry for Tag {
        const ENCODED_SIZE: usize = 8;

        fn encode_into(&self, buf: &mut Vec<u8>) -> IndexResult<()> {
            put_fixed(buf, "tag", &self.0, Self::ENCODED_SIZE)
        }

        fn decode_from(raw: &[u8], path: &Path) -> IndexResult<Self> {
            get_fixed(raw, path).map(Tag)
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded: Vec<Tag> = load_entries(&dir.path().join("absent.dat")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_persist_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.dat");
        let tags = vec![Tag("b".into()), Tag("a".into()), Tag("12345678".into())];

        persist_entries(&path, &tags).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 4 + 3 * 8);
        assert!(!tmp_path(&path).exists());

        let loaded: Vec<Tag> = load_entries(&path).unwrap();
        assert_eq!(loaded, tags);
    }

    #[test]
    fn test_header_is_little_endian_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.dat");
        persist_entries(&path, &[Tag("x".into()), Tag("y".into())]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());
    }

    #[test]
    fn test_oversized_entry_rejected() {
        let dir = TempDir::new().unwrap();
        let err = persist_entries(&dir.path().join("tags.dat"), &[Tag("123456789".into())])
            .unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexEntryTooLarge);
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.dat");
        persist_entries(&path, &[Tag("x".into()), Tag("y".into())]).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = load_entries::<Tag>(&path).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_negative_count_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.dat");
        fs::write(&path, (-1i32).to_le_bytes()).unwrap();

        let err = load_entries::<Tag>(&path).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexCorruption);
    }
}
