//! Catalog indexes
//!
//! Two sorted, in-memory indexes mirror the data file and are persisted to
//! their own files after every mutation:
//!
//! - Primary: key -> byte offset, unique keys, binary search
//! - Secondary: title -> key, ordered by normalized title
//!
//! # Invariants
//!
//! - Every primary entry points at an active record with that key
//! - Every active record has exactly one primary and one secondary entry
//! - Index updates happen only after the data file write succeeded
//! - Both indexes can always be rebuilt from a data file scan

mod errors;
mod normalize;
mod persist;
mod primary;
mod secondary;

pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use normalize::normalize;
pub use primary::{PrimaryEntry, PrimaryIndex};
pub use secondary::{SecondaryIndex, TitleEntry};
