//! Query engine
//!
//! Borrows both indexes for the duration of one resolution; it never
//! touches the data file.

use super::resolution::{Candidate, Resolution};
use crate::index::{normalize, PrimaryIndex, SecondaryIndex};

/// Candidate cap used when no configuration overrides it
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Resolves search terms against the primary and secondary indexes.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    primary: &'a PrimaryIndex,
    secondary: &'a SecondaryIndex,
    candidate_limit: usize,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine with the default candidate cap.
    pub fn new(primary: &'a PrimaryIndex, secondary: &'a SecondaryIndex) -> Self {
        Self {
            primary,
            secondary,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    /// Overrides the candidate cap. Values below 1 are raised to 1.
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    /// Current candidate cap
    pub fn candidate_limit(&self) -> usize {
        self.candidate_limit
    }

    /// Resolves `term` to a key.
    ///
    /// A term that normalizes to nothing matches nothing, even though every
    /// title contains the empty string.
    pub fn resolve(&self, term: &str) -> Resolution {
        if normalize(term).is_empty() {
            return Resolution::NotFound;
        }

        let key = term.trim();
        if self.primary.lookup(key).is_some() {
            return Resolution::Unique(key.to_string());
        }

        if let Some(key) = self.secondary.lookup_exact(term) {
            return Resolution::Unique(key.to_string());
        }

        // One extra match tells a single hit apart from a capped list.
        let mut matches = self
            .secondary
            .lookup_partial(term, self.candidate_limit.saturating_add(1));
        match matches.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Unique(matches.remove(0).key.clone()),
            _ => Resolution::Ambiguous(
                matches
                    .into_iter()
                    .take(self.candidate_limit)
                    .map(|e| Candidate {
                        key: e.key.clone(),
                        title: e.title.clone(),
                    })
                    .collect(),
            ),
        }
    }
}
