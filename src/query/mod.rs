//! Search term resolution
//!
//! Turns a user supplied term into a record key by trying, in strict order:
//!
//! 1. Primary index exact lookup (term as a key)
//! 2. Secondary index exact lookup (term as a title)
//! 3. Secondary index substring lookup, capped at the candidate limit
//!
//! The first step that finds anything wins. Step 3 may return several
//! candidates; choosing between them is left to the caller.

mod resolution;
mod resolver;

pub use resolution::{Candidate, Resolution};
pub use resolver::{QueryEngine, DEFAULT_CANDIDATE_LIMIT};
