//! The catalog: record store plus both indexes behind one owner
//!
//! Mutation order is fixed: data file first, then in-memory indexes, then
//! both index files. A failed data file write leaves the indexes untouched.
//! A crash between the data write and the index persist leaves the files
//! out of step; `rebuild_indexes` repairs that.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use super::config::CatalogConfig;
use super::errors::{CatalogError, CatalogErrorCode, CatalogResult};
use crate::import::{is_ignorable, parse_line, ImportReport, SkippedLine};
use crate::index::{IndexErrorCode, PrimaryIndex, SecondaryIndex, TitleEntry};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::query::{QueryEngine, Resolution};
use crate::storage::{MangaRecord, RecordScan, RecordStore};

/// Entry counts reported by [`Catalog::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Keys in the primary index
    pub primary_entries: usize,
    /// Entries in the secondary index
    pub secondary_entries: usize,
    /// Records in the data file, tombstoned ones included
    pub stored_records: u64,
}

/// Owned catalog handle.
///
/// Holds the only open handle on the data file for the session. Dropping it
/// without [`close`](Self::close) is safe: every mutation has already
/// persisted the indexes.
pub struct Catalog {
    config: CatalogConfig,
    store: RecordStore,
    primary: PrimaryIndex,
    secondary: SecondaryIndex,
}

impl Catalog {
    /// Opens the catalog in `config.data_dir`, creating it on first run.
    ///
    /// When neither index file exists but the data file holds records, the
    /// indexes are rebuilt from a scan and persisted.
    pub fn open(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;

        let primary_path = config.primary_index_file();
        let secondary_path = config.secondary_index_file();
        let indexes_absent = !primary_path.exists() && !secondary_path.exists();

        let store = RecordStore::open(&config.data_file()).map_err(fatal_logged)?;
        let primary = PrimaryIndex::load(&primary_path).map_err(fatal_logged)?;
        let secondary = SecondaryIndex::load(&secondary_path).map_err(fatal_logged)?;

        let mut catalog = Self {
            config,
            store,
            primary,
            secondary,
        };

        if indexes_absent && catalog.store.record_count() > 0 {
            catalog.rebuild_indexes()?;
        }

        log_event_with_fields(
            Event::CatalogOpen,
            &[
                ("data_dir", &catalog.config.data_dir.display().to_string()),
                ("primary_entries", &catalog.primary.len().to_string()),
                ("secondary_entries", &catalog.secondary.len().to_string()),
                ("stored_records", &catalog.store.record_count().to_string()),
            ],
        );

        Ok(catalog)
    }

    /// Configuration the catalog was opened with
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Read-only view of the primary index
    pub fn primary(&self) -> &PrimaryIndex {
        &self.primary
    }

    /// Read-only view of the secondary index
    pub fn secondary(&self) -> &SecondaryIndex {
        &self.secondary
    }

    /// Whether `key` belongs to an indexed record
    pub fn contains(&self, key: &str) -> bool {
        self.primary.lookup(key).is_some()
    }

    /// Creates a record and returns its data file offset.
    ///
    /// # Errors
    ///
    /// - `MANGA_DUPLICATE_KEY` if the key is already indexed
    /// - `MANGA_VALIDATION_FAILED` / `MANGA_CAPACITY_EXCEEDED` for bad fields
    /// - `MANGA_IO_FAILURE` if the append or an index persist fails
    pub fn create(&mut self, record: MangaRecord) -> CatalogResult<u64> {
        let key = record.key.trim().to_string();
        let offset = self.insert_record(record)?;
        self.persist_indexes()?;

        log_event_with_fields(
            Event::RecordCreate,
            &[("key", &key), ("offset", &offset.to_string())],
        );
        Ok(offset)
    }

    /// Returns the active record stored under `key`.
    pub fn get(&self, key: &str) -> CatalogResult<MangaRecord> {
        let (_, record) = self.locate(key)?;
        if record.is_tombstone {
            return Err(CatalogError::not_found(key));
        }
        Ok(record)
    }

    /// Resolves a key, title or title fragment.
    pub fn resolve(&self, term: &str) -> Resolution {
        let resolution = QueryEngine::new(&self.primary, &self.secondary)
            .with_candidate_limit(self.config.candidate_limit)
            .resolve(term);

        log_event_with_fields(
            Event::QueryResolved,
            &[("outcome", resolution.kind()), ("term", term)],
        );
        resolution
    }

    /// Resolves `term` and reads the record when the match is unique.
    ///
    /// # Errors
    ///
    /// - `MANGA_AMBIGUOUS` carrying the candidate list
    /// - `MANGA_NOT_FOUND` if nothing matches
    pub fn find(&self, term: &str) -> CatalogResult<MangaRecord> {
        match self.resolve(term) {
            Resolution::Unique(key) => self.get(&key),
            Resolution::Ambiguous(candidates) => Err(CatalogError::ambiguous(term, candidates)),
            Resolution::NotFound => Err(CatalogError::no_match(term)),
        }
    }

    /// Replaces the record stored under `key` in place.
    ///
    /// `record.key` must equal `key`; keys never change. A changed title is
    /// re-indexed.
    pub fn update(&mut self, key: &str, mut record: MangaRecord) -> CatalogResult<()> {
        if record.key != key {
            return Err(CatalogError::validation(format!(
                "Record key {} does not match {}",
                record.key, key
            )));
        }
        record.is_tombstone = false;
        record.validate()?;

        let (offset, current) = self.locate(key)?;
        if current.is_tombstone {
            return Err(CatalogError::not_found(key));
        }

        self.store.update(offset, &record)?;

        if current.title != record.title {
            self.secondary.remove(&current.title, key);
            insert_title(&mut self.secondary, &record.title, key)?;
        }
        self.persist_indexes()?;

        log_event_with_fields(
            Event::RecordUpdate,
            &[("key", key), ("offset", &offset.to_string())],
        );
        Ok(())
    }

    /// Soft-deletes the record stored under `key` and returns it.
    ///
    /// The record stays in the data file with its tombstone set; its key
    /// becomes free for a new record at a new offset.
    pub fn delete(&mut self, key: &str) -> CatalogResult<MangaRecord> {
        let (offset, current) = self.locate(key)?;

        if current.is_tombstone {
            // Index entries survived a delete that did not persist them
            self.primary.remove(key);
            self.secondary.remove(&current.title, key);
            self.persist_indexes()?;
            return Err(CatalogError::not_found(key));
        }

        let deleted = self.store.soft_delete(offset).map_err(fatal_logged)?;
        self.primary.remove(key);
        self.secondary.remove(&deleted.title, key);
        self.persist_indexes()?;

        log_event_with_fields(
            Event::RecordDelete,
            &[("key", key), ("offset", &offset.to_string())],
        );
        Ok(deleted)
    }

    /// Active records in storage order.
    pub fn list(&self) -> CatalogResult<RecordScan> {
        Ok(self.store.scan()?)
    }

    /// Imports every line of `reader`.
    ///
    /// Malformed lines and records that fail validation are skipped and
    /// reported; existing keys are counted as duplicates. Indexes are
    /// persisted once, after the last line. An I/O failure stops the batch
    /// after persisting what was already imported.
    pub fn import<R: BufRead>(&mut self, reader: R) -> CatalogResult<ImportReport> {
        log_event(Event::ImportStart);

        let mut report = ImportReport::default();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.persist_indexes()?;
                    return Err(CatalogError::io(
                        format!("Failed to read import line {}", line_no),
                        e,
                    ));
                }
            };
            if is_ignorable(&line) {
                continue;
            }

            let record = match parse_line(line_no, &line) {
                Ok(record) => record,
                Err(e) => {
                    skip(&mut report, line_no, e.into());
                    continue;
                }
            };

            let key = record.key.trim().to_string();
            match self.insert_record(record) {
                Ok(_) => report.imported += 1,
                Err(e) if e.code() == CatalogErrorCode::DuplicateKey => {
                    report.duplicates.push(key)
                }
                Err(e) if e.code() == CatalogErrorCode::IoFailure || e.is_fatal() => {
                    self.persist_indexes()?;
                    return Err(e);
                }
                Err(e) => skip(&mut report, line_no, e),
            }
        }

        self.persist_indexes()?;

        log_event_with_fields(
            Event::ImportComplete,
            &[
                ("duplicates", &report.duplicates.len().to_string()),
                ("imported", &report.imported.to_string()),
                ("skipped", &report.skipped.len().to_string()),
            ],
        );
        Ok(report)
    }

    /// Imports a text file; see [`import`](Self::import).
    pub fn import_file(&mut self, path: &Path) -> CatalogResult<ImportReport> {
        let file = File::open(path).map_err(|e| {
            CatalogError::io(format!("Failed to open import file {}", path.display()), e)
        })?;
        self.import(BufReader::new(file))
    }

    /// Discards both indexes and re-derives them from the data file.
    ///
    /// If two active records share a key, the later one in the file wins.
    /// Returns the number of indexed records.
    pub fn rebuild_indexes(&mut self) -> CatalogResult<usize> {
        let mut primary = PrimaryIndex::new();
        let mut secondary = SecondaryIndex::new();

        for item in self.store.scan()? {
            let (offset, record) = item.map_err(fatal_logged)?;
            if primary.remove(&record.key).is_some() {
                if let Some(title) = secondary.title_for_key(&record.key).map(str::to_string) {
                    secondary.remove(&title, &record.key);
                }
            }
            primary.insert(&record.key, offset)?;
            insert_title(&mut secondary, &record.title, &record.key)?;
        }

        self.primary = primary;
        self.secondary = secondary;
        self.persist_indexes()?;

        log_event_with_fields(
            Event::IndexRebuild,
            &[("entries", &self.primary.len().to_string())],
        );
        Ok(self.primary.len())
    }

    /// Secondary index entries in stored order
    pub fn titles(&self) -> &[TitleEntry] {
        self.secondary.entries()
    }

    /// Index and data file counts
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            primary_entries: self.primary.len(),
            secondary_entries: self.secondary.len(),
            stored_records: self.store.record_count(),
        }
    }

    /// Persists both indexes one last time and releases the data file.
    pub fn close(self) -> CatalogResult<()> {
        self.persist_indexes()?;
        log_event_with_fields(
            Event::CatalogClose,
            &[("primary_entries", &self.primary.len().to_string())],
        );
        Ok(())
    }

    /// Appends and indexes one record without persisting the index files.
    fn insert_record(&mut self, mut record: MangaRecord) -> CatalogResult<u64> {
        record.key = record.key.trim().to_string();
        record.is_tombstone = false;
        record.validate()?;

        if self.primary.lookup(&record.key).is_some() {
            return Err(CatalogError::duplicate_key(&record.key));
        }

        let offset = self.store.append(&record)?;
        self.primary.insert(&record.key, offset)?;
        insert_title(&mut self.secondary, &record.title, &record.key)?;
        Ok(offset)
    }

    /// Primary lookup followed by a checked read.
    fn locate(&self, key: &str) -> CatalogResult<(u64, MangaRecord)> {
        let offset = self
            .primary
            .lookup(key)
            .ok_or_else(|| CatalogError::not_found(key))?;
        let record = self.store.read(offset).map_err(fatal_logged)?;
        if record.key != key {
            return Err(fatal_logged(CatalogError::index_mismatch(
                key,
                offset,
                &record.key,
            )));
        }
        Ok((offset, record))
    }

    fn persist_indexes(&self) -> CatalogResult<()> {
        self.primary.persist(&self.config.primary_index_file())?;
        self.secondary
            .persist(&self.config.secondary_index_file())?;
        Ok(())
    }
}

/// Inserts a title entry, accepting one that is already present.
fn insert_title(secondary: &mut SecondaryIndex, title: &str, key: &str) -> CatalogResult<()> {
    match secondary.insert(title, key) {
        Err(e) if e.code() == IndexErrorCode::IndexDuplicateKey => Ok(()),
        other => Ok(other?),
    }
}

fn skip(report: &mut ImportReport, line_no: usize, err: CatalogError) {
    log_event_with_fields(
        Event::ImportLineSkipped,
        &[
            ("code", err.code().code()),
            ("line", &line_no.to_string()),
            ("reason", err.message()),
        ],
    );
    report.skipped.push(SkippedLine {
        line: line_no,
        code: err.code().code().to_string(),
        reason: err.message().to_string(),
    });
}

/// Converts into a catalog error, logging `DATA_CORRUPTION` when fatal.
fn fatal_logged(err: impl Into<CatalogError>) -> CatalogError {
    let err = err.into();
    if err.is_fatal() {
        log_event_with_fields(
            Event::DataCorruption,
            &[("code", err.code().code()), ("message", err.message())],
        );
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(key: &str, title: &str) -> MangaRecord {
        MangaRecord {
            key: key.to_string(),
            title: title.to_string(),
            author: "Naoki Urasawa".to_string(),
            start_year: 1994,
            end_year: Some(2001),
            genre: "Seinen".to_string(),
            magazine: "Big Comic Original".to_string(),
            publisher: "Panini".to_string(),
            edition_year: 2012,
            total_volumes: 18,
            volumes: vec![1, 2, 3],
            is_tombstone: false,
        }
    }

    fn open(dir: &TempDir) -> Catalog {
        Catalog::open(CatalogConfig::new(dir.path())).unwrap()
    }

    #[test]
    fn test_create_then_get() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);

        let offset = catalog.create(record("k1", "Monster")).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(catalog.get("k1").unwrap().title, "Monster");
        assert_eq!(catalog.primary().lookup("k1"), Some(0));
        assert_eq!(catalog.secondary().lookup_exact("monster"), Some("k1"));
    }

    #[test]
    fn test_create_trims_key() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("  k1 ", "Monster")).unwrap();
        assert!(catalog.contains("k1"));
    }

    #[test]
    fn test_duplicate_key_rejected_without_append() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();

        let err = catalog.create(record("k1", "Pluto")).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::DuplicateKey);
        assert_eq!(catalog.stats().stored_records, 1);
    }

    #[test]
    fn test_invalid_record_rejected_without_append() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);

        let err = catalog.create(record("k1", "   ")).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::ValidationFailure);

        let err = catalog.create(record("k2", &"x".repeat(101))).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::CapacityExceeded);

        assert_eq!(catalog.stats().stored_records, 0);
        assert!(catalog.primary().is_empty());
    }

    #[test]
    fn test_update_requires_matching_key() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();

        let err = catalog.update("k1", record("k2", "Monster")).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::ValidationFailure);
    }

    #[test]
    fn test_update_reindexes_title() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();

        catalog.update("k1", record("k1", "Pluto")).unwrap();
        assert_eq!(catalog.secondary().lookup_exact("pluto"), Some("k1"));
        assert_eq!(catalog.secondary().lookup_exact("monster"), None);
        assert_eq!(catalog.secondary().len(), 1);
        assert_eq!(catalog.get("k1").unwrap().title, "Pluto");
    }

    #[test]
    fn test_delete_frees_key() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        let first = catalog.create(record("k1", "Monster")).unwrap();

        let deleted = catalog.delete("k1").unwrap();
        assert!(deleted.is_tombstone);
        assert_eq!(catalog.get("k1").unwrap_err().code(), CatalogErrorCode::NotFound);
        assert_eq!(catalog.delete("k1").unwrap_err().code(), CatalogErrorCode::NotFound);

        let second = catalog.create(record("k1", "Monster")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_find_ambiguous_carries_candidates() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "One Piece")).unwrap();
        catalog.create(record("k2", "One Punch Man")).unwrap();

        let err = catalog.find("one").unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::Ambiguous);
        assert_eq!(err.candidates().len(), 2);

        assert_eq!(catalog.find("punch").unwrap().key, "k2");
        assert_eq!(catalog.find("zzz").unwrap_err().code(), CatalogErrorCode::NotFound);
    }

    #[test]
    fn test_import_skips_and_reports() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();

        let input = "\
# key; title; ...
k1;Monster;Naoki Urasawa;1994;2001;Seinen;Big Comic Original;Panini;2012;18;0
k2;Pluto;Naoki Urasawa;2003;2009;Seinen;Big Comic Original;Panini;2010;8;2;[1, 2]
k3;Broken line

k4;20th Century Boys;Naoki Urasawa;1999;2006;Seinen;Big Comic Spirits;Panini;2012;22;1;[1]
";
        let report = catalog.import(input.as_bytes()).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.duplicates, vec!["k1".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 4);
        assert_eq!(report.skipped[0].code, "MANGA_VALIDATION_FAILED");

        assert!(catalog.contains("k2"));
        assert!(catalog.contains("k4"));
    }

    #[test]
    fn test_rebuild_matches_incremental_indexes() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();
        catalog.create(record("k2", "Pluto")).unwrap();
        catalog.create(record("k3", "Master Keaton")).unwrap();
        catalog.delete("k2").unwrap();

        let primary_before = catalog.primary().entries().to_vec();
        let titles_before = catalog.titles().to_vec();

        assert_eq!(catalog.rebuild_indexes().unwrap(), 2);
        assert_eq!(catalog.primary().entries(), primary_before.as_slice());
        assert_eq!(catalog.titles(), titles_before.as_slice());
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let mut catalog = open(&dir);
        catalog.create(record("k1", "Monster")).unwrap();
        catalog.create(record("k2", "Pluto")).unwrap();
        catalog.delete("k1").unwrap();

        assert_eq!(
            catalog.stats(),
            CatalogStats {
                primary_entries: 1,
                secondary_entries: 1,
                stored_records: 2,
            }
        );
    }
}
