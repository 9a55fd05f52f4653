//! Catalog subsystem
//!
//! Owns the record store and both indexes for one session and exposes the
//! catalog operations: create, get, resolve/find, update, delete, list,
//! bulk import and index rebuild.
//!
//! # Lifecycle
//!
//! 1. `Catalog::open` loads both index files (rebuilding them if absent)
//! 2. Every mutation persists both index files before returning
//! 3. `Catalog::close` persists once more and releases the data file

mod catalog;
mod config;
mod errors;

pub use catalog::{Catalog, CatalogStats};
pub use config::{CatalogConfig, DATA_FILE, PRIMARY_INDEX_FILE, SECONDARY_INDEX_FILE};
pub use errors::{CatalogError, CatalogErrorCode, CatalogResult, Severity};
