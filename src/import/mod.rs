//! Bulk import of the `;` delimited text format
//!
//! One record per line:
//!
//! ```text
//! key; title; author; start; end|-; genre; magazine; publisher; edition; total; acquired; [v1, v2]
//! ```
//!
//! Parsing is line-local: a bad line is reported and skipped, the rest of
//! the batch continues. Duplicate detection and index maintenance happen in
//! the catalog, exactly as for a single create.

mod errors;
mod parser;
mod report;

pub use errors::{ImportError, ImportResult};
pub use parser::{is_ignorable, parse_line, FIELD_SEPARATOR, ONGOING_MARKER};
pub use report::{ImportReport, SkippedLine};
