//! Rating table loading and rater column selection.
//!
//! The input is a plain text file with one subject per line and one rater
//! per column. Columns are separated by runs of spaces or tabs. There is no
//! header line and every token is numeric.
//!
//! ```text
//! 0 0 0
//! 1 1 1
//! 0 1 0
//! ```
//!
//! Loading does no shape checking; that happens in [`AgreementInput::select`].

mod select;

pub use select::AgreementInput;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// A table of raw ratings, one row per subject.
///
/// Rows are kept exactly as read, including empty ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTable {
    rows: Vec<Vec<f64>>,
}

impl RatingTable {
    /// Create a table from rows that were already parsed.
    #[must_use]
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Load a table from a whitespace-delimited text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rows = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| Error::Load {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(parse_line(&line, rows.len()));
        }

        let table = Self::new(rows);
        log::debug!(
            "Loaded {} rows ({} columns in first row) from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a table from in-memory text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .enumerate()
                .map(|(idx, line)| parse_line(line, idx))
                .collect(),
        )
    }

    /// All rows of the table.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows (subjects).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the first row, or zero for an empty table.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Split a line on whitespace and parse each token.
///
/// Reading stops at the first token that is not a finite number; `nan` and
/// `inf` count as text.
fn parse_line(line: &str, line_idx: usize) -> Vec<f64> {
    let mut values = Vec::new();
    for token in line.split_whitespace() {
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => {
                log::warn!(
                    "Line {}: non-numeric token {:?}, ignoring rest of line",
                    line_idx + 1,
                    token
                );
                break;
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_mixed_whitespace() {
        let table = RatingTable::parse("1 2\t3\n4  \t 5 6\n");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows()[1], vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_keeps_empty_rows() {
        let table = RatingTable::parse("1 2\n\n3 4\n");
        assert_eq!(table.row_count(), 3);
        assert!(table.rows()[1].is_empty());
    }

    #[test]
    fn test_parse_stops_at_text() {
        let table = RatingTable::parse("1 2 abc 4\n");
        assert_eq!(table.rows()[0], vec![1.0, 2.0]);
    }

    #[test]
    fn test_parse_stops_at_nan() {
        let table = RatingTable::parse("nan 1\n0 NaN 1\n1 inf\n2 -Infinity 3\n");
        assert!(table.rows()[0].is_empty());
        assert_eq!(table.rows()[1], vec![0.0]);
        assert_eq!(table.rows()[2], vec![1.0]);
        assert_eq!(table.rows()[3], vec![2.0]);
    }

    #[test]
    fn test_empty_table_has_no_columns() {
        let table = RatingTable::parse("");
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0").unwrap();
        writeln!(file, "1 1 1").unwrap();
        writeln!(file, "0 1 0").unwrap();

        let table = RatingTable::load(file.path()).unwrap();
        assert_eq!(table, RatingTable::parse("0 0 0\n1 1 1\n0 1 0\n"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RatingTable::load(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
