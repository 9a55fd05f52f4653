//! Index Persistence Tests
//!
//! Tests for the on-disk index files:
//! - persist then load yields identical entries in identical order
//! - file layout is an i32 LE count followed by fixed-width entries
//! - missing and empty files load as empty indexes
//! - malformed files are fatal

use mangastore::index::{IndexErrorCode, PrimaryIndex, SecondaryIndex};
use mangastore::storage::{KEY_CAPACITY, TITLE_CAPACITY};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn titles() -> SecondaryIndex {
    let mut index = SecondaryIndex::new();
    for (title, key) in [
        ("One Piece", "k1"),
        ("Naruto", "k2"),
        ("One Punch Man", "k3"),
        ("ONE PIECE", "k0"),
        ("Ao no Exorcist", "k4"),
    ] {
        index.insert(title, key).unwrap();
    }
    index
}

// =============================================================================
// Round Trip Tests
// =============================================================================

/// Primary entries survive persist/load in order.
#[test]
fn test_primary_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primary_index.dat");

    let mut index = PrimaryIndex::new();
    for (i, key) in ["978-3", "978-1", "978-2", "978-10"].iter().enumerate() {
        index.insert(key, (i * 795) as u64).unwrap();
    }
    index.persist(&path).unwrap();

    let loaded = PrimaryIndex::load(&path).unwrap();
    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.entries(), index.entries());
}

/// Secondary entries survive persist/load in order, titles unaltered.
#[test]
fn test_secondary_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secondary_index.dat");

    let index = titles();
    index.persist(&path).unwrap();

    let loaded = SecondaryIndex::load(&path).unwrap();
    assert_eq!(loaded.entries(), index.entries());
    assert_eq!(loaded.lookup_exact("one piece"), Some("k0"));
    assert_eq!(loaded.title_for_key("k0"), Some("ONE PIECE"));
}

/// Persisting twice over the same path replaces the file.
#[test]
fn test_persist_replaces_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primary_index.dat");

    let mut index = PrimaryIndex::new();
    index.insert("a", 0).unwrap();
    index.insert("b", 795).unwrap();
    index.persist(&path).unwrap();

    index.remove("a");
    index.persist(&path).unwrap();

    let loaded = PrimaryIndex::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.lookup("b"), Some(795));
    assert!(!dir.path().join("primary_index.dat.tmp").exists());
}

// =============================================================================
// File Layout Tests
// =============================================================================

/// Secondary file is count + count x (title slot + key slot).
#[test]
fn test_secondary_file_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secondary_index.dat");
    titles().persist(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], &5i32.to_le_bytes());
    assert_eq!(bytes.len(), 4 + 5 * (TITLE_CAPACITY + KEY_CAPACITY));
}

/// Entries written in arbitrary order are re-sorted on load.
#[test]
fn test_unsorted_secondary_file_resorted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secondary_index.dat");

    let mut bytes = 2i32.to_le_bytes().to_vec();
    for (title, key) in [("Zetman", "k1"), ("Akira", "k2")] {
        let mut slot = title.as_bytes().to_vec();
        slot.resize(TITLE_CAPACITY, 0);
        bytes.extend_from_slice(&slot);
        let mut slot = key.as_bytes().to_vec();
        slot.resize(KEY_CAPACITY, 0);
        bytes.extend_from_slice(&slot);
    }
    fs::write(&path, bytes).unwrap();

    let loaded = SecondaryIndex::load(&path).unwrap();
    assert_eq!(loaded.entries()[0].title, "Akira");
    assert_eq!(loaded.lookup_exact("zetman"), Some("k1"));
}

// =============================================================================
// Load Edge Cases
// =============================================================================

/// Missing and zero-length files are first-run empty indexes.
#[test]
fn test_missing_or_empty_file_is_empty_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primary_index.dat");
    assert!(PrimaryIndex::load(&path).unwrap().is_empty());

    fs::write(&path, b"").unwrap();
    assert!(PrimaryIndex::load(&path).unwrap().is_empty());
}

/// Count header promising more entries than present is corruption.
#[test]
fn test_short_file_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primary_index.dat");
    fs::write(&path, 3i32.to_le_bytes()).unwrap();

    let err = PrimaryIndex::load(&path).unwrap_err();
    assert_eq!(err.code(), IndexErrorCode::IndexCorruption);
    assert!(err.is_fatal());
}

/// Duplicate keys in a primary file are corruption.
#[test]
fn test_duplicate_primary_key_in_file_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("primary_index.dat");

    let mut bytes = 2i32.to_le_bytes().to_vec();
    for offset in [0i64, 795] {
        let mut slot = b"k1".to_vec();
        slot.resize(KEY_CAPACITY, 0);
        bytes.extend_from_slice(&slot);
        bytes.extend_from_slice(&offset.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let err = PrimaryIndex::load(&path).unwrap_err();
    assert_eq!(err.code(), IndexErrorCode::IndexCorruption);
}
