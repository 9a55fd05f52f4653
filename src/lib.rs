//! mangastore - a persistent, indexed manga catalog
//!
//! Fixed-size records in a flat data file, addressed by byte offset, with
//! two sorted indexes persisted beside it:
//!
//! - `storage`: record layout, checksums, offset-addressed store, scans
//! - `index`: primary (key -> offset) and secondary (title -> key) indexes
//! - `query`: key / exact title / partial title resolution
//! - `catalog`: the owned store object tying the three files together
//! - `import`: `;` delimited bulk import
//! - `observability`: structured JSON logging
//! - `cli`: one-shot command line

pub mod catalog;
pub mod cli;
pub mod import;
pub mod index;
pub mod observability;
pub mod query;
pub mod storage;

pub use catalog::{Catalog, CatalogConfig, CatalogError, CatalogErrorCode, CatalogResult};
pub use query::{Candidate, Resolution};
pub use storage::MangaRecord;
