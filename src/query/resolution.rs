//! Resolution outcome types

use serde::Serialize;

/// A possible match offered when a term is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub key: String,
    pub title: String,
}

/// Outcome of resolving a search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one record matched
    Unique(String),
    /// Several titles contain the term, in stored index order
    Ambiguous(Vec<Candidate>),
    /// Nothing matched
    NotFound,
}

impl Resolution {
    /// Returns the resolved key when the match is unique
    pub fn unique_key(&self) -> Option<&str> {
        match self {
            Resolution::Unique(key) => Some(key),
            _ => None,
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Unique(_) => "unique",
            Resolution::Ambiguous(_) => "ambiguous",
            Resolution::NotFound => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_key() {
        assert_eq!(Resolution::Unique("k1".into()).unique_key(), Some("k1"));
        assert_eq!(Resolution::NotFound.unique_key(), None);
        assert_eq!(Resolution::Ambiguous(vec![]).unique_key(), None);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Resolution::Unique("k".into()).kind(), "unique");
        assert_eq!(Resolution::NotFound.kind(), "not_found");
    }
}
