//! Primary index: key -> data file offset
//!
//! A sorted vector of `(key, offset)` pairs. Keys are unique and ordered by
//! byte comparison, so lookups are a binary search.

use std::path::Path;

use super::errors::{IndexError, IndexResult};
use super::persist::{self, get_fixed, put_fixed, IndexEntry};
use crate::storage::KEY_CAPACITY;

/// One primary index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryEntry {
    /// Record key
    pub key: String,
    /// Byte offset of the record in the data file
    pub offset: u64,
}

impl IndexEntry for PrimaryEntry {
    const ENCODED_SIZE: usize = KEY_CAPACITY + 8;

    fn encode_into(&self, buf: &mut Vec<u8>) -> IndexResult<()> {
        put_fixed(buf, "key", &self.key, KEY_CAPACITY)?;
        let offset = i64::try_from(self.offset)
            .map_err(|_| IndexError::entry_too_large("offset", 8, 8))?;
        buf.extend_from_slice(&offset.to_le_bytes());
        Ok(())
    }

    fn decode_from(raw: &[u8], path: &Path) -> IndexResult<Self> {
        let key = get_fixed(&raw[..KEY_CAPACITY], path)?;
        let mut offset_bytes = [0u8; 8];
        offset_bytes.copy_from_slice(&raw[KEY_CAPACITY..]);
        let offset = i64::from_le_bytes(offset_bytes);
        let offset = u64::try_from(offset).map_err(|_| {
            IndexError::corruption(path, format!("negative offset {} for key {}", offset, key))
        })?;
        Ok(Self { key, offset })
    }
}

/// In-memory primary index.
#[derive(Debug, Default)]
pub struct PrimaryIndex {
    /// Sorted ascending by key, keys unique
    entries: Vec<PrimaryEntry>,
}

impl PrimaryIndex {
    /// Creates a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the offset recorded for `key`.
    pub fn lookup(&self, key: &str) -> Option<u64> {
        self.position(key).ok().map(|pos| self.entries[pos].offset)
    }

    /// Inserts `key` at its sorted position.
    ///
    /// Callers check with [`lookup`](Self::lookup) first; an existing key is
    /// still refused with `MANGA_INDEX_DUPLICATE_KEY`.
    pub fn insert(&mut self, key: &str, offset: u64) -> IndexResult<()> {
        match self.position(key) {
            Ok(_) => Err(IndexError::duplicate_key(key)),
            Err(pos) => {
                self.entries.insert(
                    pos,
                    PrimaryEntry {
                        key: key.to_string(),
                        offset,
                    },
                );
                Ok(())
            }
        }
    }

    /// Removes `key`, compacting the array. Returns the removed offset;
    /// an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        let pos = self.position(key).ok()?;
        Some(self.entries.remove(pos).offset)
    }

    /// Entries in key order
    pub fn entries(&self) -> &[PrimaryEntry] {
        &self.entries
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes the whole index to `path`.
    pub fn persist(&self, path: &Path) -> IndexResult<()> {
        persist::persist_entries(path, &self.entries)
    }

    /// Loads an index from `path`; a missing file gives an empty index.
    ///
    /// Entries are re-sorted on load; a repeated key is corruption.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let mut entries: Vec<PrimaryEntry> = persist::load_entries(path)?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(pair) = entries.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(IndexError::corruption(
                path,
                format!("duplicate key {}", pair[0].key),
            ));
        }
        Ok(Self { entries })
    }

    fn position(&self, key: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|entry| entry.key.as_str().cmp(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = PrimaryIndex::new();
        index.insert("b", 795).unwrap();
        index.insert("a", 0).unwrap();
        index.insert("c", 1590).unwrap();

        assert_eq!(index.lookup("a"), Some(0));
        assert_eq!(index.lookup("b"), Some(795));
        assert_eq!(index.lookup("c"), Some(1590));
        assert_eq!(index.lookup("d"), None);
    }

    #[test]
    fn test_entries_sorted_regardless_of_insert_order() {
        let mut index = PrimaryIndex::new();
        for (i, key) in ["m", "c", "x", "a"].iter().enumerate() {
            index.insert(key, i as u64).unwrap();
        }
        let keys: Vec<&str> = index.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "m", "x"]);
    }

    #[test]
    fn test_duplicate_insert_refused() {
        let mut index = PrimaryIndex::new();
        index.insert("k1", 0).unwrap();
        let err = index.insert("k1", 795).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexDuplicateKey);
        assert_eq!(index.lookup("k1"), Some(0));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_compacts() {
        let mut index = PrimaryIndex::new();
        index.insert("a", 0).unwrap();
        index.insert("b", 795).unwrap();
        index.insert("c", 1590).unwrap();

        assert_eq!(index.remove("b"), Some(795));
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("b"), None);
        assert_eq!(index.lookup("c"), Some(1590));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut index = PrimaryIndex::new();
        index.insert("a", 0).unwrap();
        assert_eq!(index.remove("zzz"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_reinsert_after_remove() {
        let mut index = PrimaryIndex::new();
        index.insert("k1", 0).unwrap();
        index.remove("k1");
        index.insert("k1", 2385).unwrap();
        assert_eq!(index.lookup("k1"), Some(2385));
    }

    #[test]
    fn test_persist_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("primary_index.dat");

        let mut index = PrimaryIndex::new();
        index.insert("978-1", 0).unwrap();
        index.insert("978-3", 795).unwrap();
        index.insert("978-2", 1590).unwrap();
        index.persist(&path).unwrap();

        assert_eq!(
            fs::metadata(&path).unwrap().len(),
            4 + 3 * PrimaryEntry::ENCODED_SIZE as u64
        );

        let loaded = PrimaryIndex::load(&path).unwrap();
        assert_eq!(loaded.entries(), index.entries());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let index = PrimaryIndex::load(&dir.path().join("primary_index.dat")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_negative_offset_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("primary_index.dat");

        let mut bytes = 1i32.to_le_bytes().to_vec();
        let mut key = b"k1".to_vec();
        key.resize(KEY_CAPACITY, 0);
        bytes.extend_from_slice(&key);
        bytes.extend_from_slice(&(-5i64).to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = PrimaryIndex::load(&path).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexCorruption);
    }

    #[test]
    fn test_key_wider_than_slot_not_persisted() {
        let dir = TempDir::new().unwrap();
        let mut index = PrimaryIndex::new();
        index.insert(&"k".repeat(KEY_CAPACITY + 1), 0).unwrap();

        let err = index.persist(&dir.path().join("primary_index.dat")).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexEntryTooLarge);
    }
}
