//! Line parser for the bulk import format

use std::str::FromStr;

use super::errors::{ImportError, ImportResult};
use crate::storage::MangaRecord;

/// Separates fields within a line
pub const FIELD_SEPARATOR: char = ';';

/// End-year value marking a series still in publication
pub const ONGOING_MARKER: &str = "-";

const FIELD_NAMES: [&str; 12] = [
    "key",
    "title",
    "author",
    "start_year",
    "end_year",
    "genre",
    "magazine",
    "publisher",
    "edition_year",
    "total_volumes",
    "acquired_volumes",
    "volumes",
];

/// Whether a line carries no record (blank or `#` comment)
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parses one import line into a candidate record.
///
/// `line_no` is 1-based and only used for error context. The returned
/// record has not been validated against field capacities yet.
pub fn parse_line(line_no: usize, line: &str) -> ImportResult<MangaRecord> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() > FIELD_NAMES.len() {
        return Err(ImportError::TooManyFields {
            line: line_no,
            found: fields.len(),
        });
    }

    let field = |i: usize| required(&fields, line_no, i);

    let key = field(0)?.to_string();
    let title = field(1)?.to_string();
    let author = field(2)?.to_string();
    let start_year = number(line_no, FIELD_NAMES[3], field(3)?)?;
    let end_year = match field(4)? {
        ONGOING_MARKER => None,
        raw => Some(number(line_no, FIELD_NAMES[4], raw)?),
    };
    let genre = field(5)?.to_string();
    let magazine = field(6)?.to_string();
    let publisher = field(7)?.to_string();
    let edition_year = number(line_no, FIELD_NAMES[8], field(8)?)?;
    let total_volumes = number(line_no, FIELD_NAMES[9], field(9)?)?;
    let acquired: usize = number(line_no, FIELD_NAMES[10], field(10)?)?;

    let volumes = match fields.get(11) {
        Some(raw) => parse_volume_list(line_no, raw)?,
        None if acquired == 0 => Vec::new(),
        None => {
            return Err(ImportError::MissingField {
                line: line_no,
                field: FIELD_NAMES[11],
            })
        }
    };
    if volumes.len() != acquired {
        return Err(ImportError::VolumeCountMismatch {
            line: line_no,
            declared: acquired,
            listed: volumes.len(),
        });
    }

    Ok(MangaRecord {
        key,
        title,
        author,
        start_year,
        end_year,
        genre,
        magazine,
        publisher,
        edition_year,
        total_volumes,
        volumes,
        is_tombstone: false,
    })
}

fn required<'a>(fields: &[&'a str], line_no: usize, i: usize) -> ImportResult<&'a str> {
    fields.get(i).copied().ok_or(ImportError::MissingField {
        line: line_no,
        field: FIELD_NAMES[i],
    })
}

fn number<T: FromStr>(line_no: usize, field: &'static str, raw: &str) -> ImportResult<T> {
    if raw.is_empty() {
        return Err(ImportError::MissingField {
            line: line_no,
            field,
        });
    }
    raw.parse().map_err(|_| ImportError::InvalidNumber {
        line: line_no,
        field,
        value: raw.to_string(),
    })
}

fn parse_volume_list(line_no: usize, raw: &str) -> ImportResult<Vec<u32>> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ImportError::InvalidVolumeList {
            line: line_no,
            reason: format!("expected [v1, v2, ...], found '{}'", raw),
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.parse().map_err(|_| ImportError::InvalidVolumeList {
                line: line_no,
                reason: format!("'{}' is not a volume number", v),
            })
        })
        .collect()
}
