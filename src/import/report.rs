//! Import batch summary

use serde::Serialize;

/// One rejected input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    /// Stable error code
    pub code: String,
    pub reason: String,
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Records created
    pub imported: usize,
    /// Keys already present, left untouched
    pub duplicates: Vec<String>,
    /// Lines rejected by parsing or validation
    pub skipped: Vec<SkippedLine>,
}

impl ImportReport {
    /// Lines that produced a record or a duplicate notice
    pub fn processed(&self) -> usize {
        self.imported + self.duplicates.len()
    }

    /// Whether every non-ignorable line was imported
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        let report = ImportReport::default();
        assert!(report.is_clean());
        assert_eq!(report.processed(), 0);
    }

    #[test]
    fn test_duplicates_count_as_processed() {
        let report = ImportReport {
            imported: 3,
            duplicates: vec!["k1".into()],
            skipped: Vec::new(),
        };
        assert_eq!(report.processed(), 4);
        assert!(!report.is_clean());
    }
}
