//! Secondary index: title -> key
//!
//! Entries are kept sorted by `(normalized title, key)`. Exact lookups are a
//! binary search on the normalized title; when several records share a
//! normalized title the first in stored order (lowest key) wins. Substring
//! lookups scan every entry in stored order.

use std::cmp::Ordering;
use std::path::Path;

use super::errors::{IndexError, IndexResult};
use super::normalize::normalize;
use super::persist::{self, get_fixed, put_fixed, IndexEntry};
use crate::storage::{KEY_CAPACITY, TITLE_CAPACITY};

/// One secondary index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    /// Title as entered
    pub title: String,
    /// Key of the record carrying this title
    pub key: String,
    /// Cached `normalize(title)`; never persisted
    normalized: String,
}

impl TitleEntry {
    /// Builds an entry, computing its normalized title.
    pub fn new(title: impl Into<String>, key: impl Into<String>) -> Self {
        let title = title.into();
        let normalized = normalize(&title);
        Self {
            title,
            key: key.into(),
            normalized,
        }
    }

    /// Canonical comparison form of the title
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    fn sort_cmp(&self, normalized: &str, key: &str) -> Ordering {
        self.normalized
            .as_str()
            .cmp(normalized)
            .then_with(|| self.key.as_str().cmp(key))
    }
}

impl IndexEntry for TitleEntry {
    const ENCODED_SIZE: usize = TITLE_CAPACITY + KEY_CAPACITY;

    fn encode_into(&self, buf: &mut Vec<u8>) -> IndexResult<()> {
        put_fixed(buf, "title", &self.title, TITLE_CAPACITY)?;
        put_fixed(buf, "key", &self.key, KEY_CAPACITY)
    }

    fn decode_from(raw: &[u8], path: &Path) -> IndexResult<Self> {
        let title = get_fixed(&raw[..TITLE_CAPACITY], path)?;
        let key = get_fixed(&raw[TITLE_CAPACITY..], path)?;
        Ok(Self::new(title, key))
    }
}

/// In-memory secondary index.
#[derive(Debug, Default)]
pub struct SecondaryIndex {
    /// Sorted by (normalized title, key)
    entries: Vec<TitleEntry>,
}

impl SecondaryIndex {
    /// Creates a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key of the first entry whose normalized title equals
    /// `normalize(title)`.
    pub fn lookup_exact(&self, title: &str) -> Option<&str> {
        let target = normalize(title);
        let pos = self
            .entries
            .partition_point(|e| e.normalized.as_str() < target.as_str());
        self.entries
            .get(pos)
            .filter(|e| e.normalized == target)
            .map(|e| e.key.as_str())
    }

    /// Returns up to `limit` entries whose normalized title contains
    /// `normalize(term)`, in stored order. No ranking is applied.
    pub fn lookup_partial(&self, term: &str, limit: usize) -> Vec<&TitleEntry> {
        let needle = normalize(term);
        self.entries
            .iter()
            .filter(|e| e.normalized.contains(needle.as_str()))
            .take(limit)
            .collect()
    }

    /// Inserts `(title, key)` at its sorted position.
    ///
    /// The same key may appear under one title only once.
    pub fn insert(&mut self, title: &str, key: &str) -> IndexResult<()> {
        let entry = TitleEntry::new(title, key);
        match self.position(&entry.normalized, key) {
            Ok(_) => Err(IndexError::duplicate_key(key)),
            Err(pos) => {
                self.entries.insert(pos, entry);
                Ok(())
            }
        }
    }

    /// Removes the entry for exactly this record. Returns whether one was
    /// found.
    pub fn remove(&mut self, title: &str, key: &str) -> bool {
        match self.position(&normalize(title), key) {
            Ok(pos) => {
                self.entries.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the first entry (in stored order) whose normalized title
    /// equals `normalize(title)`, whatever its key.
    pub fn remove_title(&mut self, title: &str) -> Option<TitleEntry> {
        let target = normalize(title);
        let pos = self
            .entries
            .partition_point(|e| e.normalized.as_str() < target.as_str());
        if self.entries.get(pos)?.normalized == target {
            Some(self.entries.remove(pos))
        } else {
            None
        }
    }

    /// Title indexed for `key`, if any
    pub fn title_for_key(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.title.as_str())
    }

    /// Entries in stored order
    pub fn entries(&self) -> &[TitleEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries
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
    /// Entries are re-sorted with the normalized comparator on load.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let mut entries: Vec<TitleEntry> = persist::load_entries(path)?;
        entries.sort_by(|a, b| a.sort_cmp(&b.normalized, &b.key));
        if let Some(pair) = entries
            .windows(2)
            .find(|w| w[0].sort_cmp(&w[1].normalized, &w[1].key) == Ordering::Equal)
        {
            return Err(IndexError::corruption(
                path,
                format!("duplicate entry for key {}", pair[0].key),
            ));
        }
        Ok(Self { entries })
    }

    fn position(&self, normalized: &str, key: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|e| e.sort_cmp(normalized, key))
    }
}
