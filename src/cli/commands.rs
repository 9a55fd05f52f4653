//! CLI command implementations
//!
//! Every command is one-shot: load config, open the catalog, run a single
//! operation, print one JSON response, close.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::{Catalog, CatalogConfig, CatalogError};
use crate::observability::Logger;
use crate::storage::{MangaRecord, StorageResult};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Partial record accepted by `update`. Absent fields keep their value;
/// the key cannot be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// `true` clears the end year
    pub ongoing: Option<bool>,
    pub genre: Option<String>,
    pub magazine: Option<String>,
    pub publisher: Option<String>,
    pub edition_year: Option<i32>,
    pub total_volumes: Option<u32>,
    pub volumes: Option<Vec<u32>>,
}

impl RecordPatch {
    /// Merges the patch into `record`.
    pub fn apply(self, record: &mut MangaRecord) -> CliResult<()> {
        if self.ongoing == Some(true) && self.end_year.is_some() {
            return Err(CliError::bad_input(
                "end_year and ongoing=true are mutually exclusive",
            ));
        }

        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(author) = self.author {
            record.author = author;
        }
        if let Some(start_year) = self.start_year {
            record.start_year = start_year;
        }
        if self.ongoing == Some(true) {
            record.end_year = None;
        } else if let Some(end_year) = self.end_year {
            record.end_year = Some(end_year);
        }
        if let Some(genre) = self.genre {
            record.genre = genre;
        }
        if let Some(magazine) = self.magazine {
            record.magazine = magazine;
        }
        if let Some(publisher) = self.publisher {
            record.publisher = publisher;
        }
        if let Some(edition_year) = self.edition_year {
            record.edition_year = edition_year;
        }
        if let Some(total_volumes) = self.total_volumes {
            record.total_volumes = total_volumes;
        }
        if let Some(volumes) = self.volumes {
            record.volumes = volumes;
        }
        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments, runs the command and prints its response. This is the
/// only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Run the appropriate command and return its response payload
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Add { config } => {
            let request = read_request()?;
            add(&config, request)
        }
        Command::Get { term, config } => get(&config, &term),
        Command::Update { term, config } => {
            let request = read_request()?;
            update(&config, &term, request)
        }
        Command::Delete { term, config } => delete(&config, &term),
        Command::List { config } => list(&config),
        Command::Import { file, config } => import(&config, &file),
        Command::Titles { config } => titles(&config),
        Command::Reindex { config } => reindex(&config),
        Command::Stats { config } => stats(&config),
    }
}

/// Create the data directory and empty catalog files
pub fn init(config_path: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    if is_initialized(&config) {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(&config.data_dir).map_err(|e| {
        CliError::io_error(format!(
            "Failed to create directory {}: {}",
            config.data_dir.display(),
            e
        ))
    })?;

    let data_dir = config.data_dir.display().to_string();
    Catalog::open(config)?.close()?;

    Ok(json!({"initialized": true, "data_dir": data_dir}))
}

/// Create a record from a JSON object
pub fn add(config_path: &Path, request: Value) -> CliResult<Value> {
    let record: MangaRecord = serde_json::from_value(request)?;
    let key = record.key.trim().to_string();
    let mut catalog = open_catalog(config_path)?;

    let offset = catalog.create(record)?;
    catalog.close()?;

    Ok(json!({"key": key, "offset": offset}))
}

/// Resolve a term and return its record
pub fn get(config_path: &Path, term: &str) -> CliResult<Value> {
    let catalog = open_catalog(config_path)?;
    let record = catalog.find(term)?;
    Ok(serde_json::to_value(record)?)
}

/// Resolve a term, merge a patch into its record and write it back
pub fn update(config_path: &Path, term: &str, request: Value) -> CliResult<Value> {
    let patch: RecordPatch = serde_json::from_value(request)?;
    let mut catalog = open_catalog(config_path)?;

    let mut record = catalog.find(term)?;
    patch.apply(&mut record)?;
    let key = record.key.clone();
    catalog.update(&key, record)?;

    let updated = catalog.get(&key)?;
    catalog.close()?;
    Ok(serde_json::to_value(updated)?)
}

/// Resolve a term and soft-delete its record
pub fn delete(config_path: &Path, term: &str) -> CliResult<Value> {
    let mut catalog = open_catalog(config_path)?;

    let key = catalog.find(term)?.key;
    let deleted = catalog.delete(&key)?;
    catalog.close()?;

    Ok(json!({"deleted": deleted.key, "title": deleted.title}))
}

/// All active records in storage order
pub fn list(config_path: &Path) -> CliResult<Value> {
    let catalog = open_catalog(config_path)?;
    let records = catalog
        .list()?
        .map(|item| item.map(|(_, record)| record))
        .collect::<StorageResult<Vec<MangaRecord>>>()
        .map_err(CatalogError::from)?;

    Ok(json!({"count": records.len(), "records": records}))
}

/// Bulk import a text file
pub fn import(config_path: &Path, file: &Path) -> CliResult<Value> {
    let mut catalog = open_catalog(config_path)?;
    let report = catalog.import_file(file)?;
    catalog.close()?;
    Ok(serde_json::to_value(report)?)
}

/// Title index dump
pub fn titles(config_path: &Path) -> CliResult<Value> {
    let catalog = open_catalog(config_path)?;
    let entries: Vec<Value> = catalog
        .titles()
        .iter()
        .map(|e| json!({"title": e.title, "normalized": e.normalized(), "key": e.key}))
        .collect();
    Ok(json!({"entries": entries}))
}

/// Rebuild both indexes from the data file
pub fn reindex(config_path: &Path) -> CliResult<Value> {
    let mut catalog = open_catalog(config_path)?;
    let entries = catalog.rebuild_indexes()?;
    catalog.close()?;
    Ok(json!({"entries": entries}))
}

/// Index and data file counts
pub fn stats(config_path: &Path) -> CliResult<Value> {
    let catalog = open_catalog(config_path)?;
    Ok(serde_json::to_value(catalog.stats())?)
}

fn load_config(config_path: &Path) -> CliResult<CatalogConfig> {
    let config = CatalogConfig::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);
    Ok(config)
}

fn is_initialized(config: &CatalogConfig) -> bool {
    config.data_file().exists()
}

fn open_catalog(config_path: &Path) -> CliResult<Catalog> {
    let config = load_config(config_path)?;
    if !is_initialized(&config) {
        return Err(CliError::not_initialized());
    }
    Ok(Catalog::open(config)?)
}
