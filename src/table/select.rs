//! Rater column selection and validation.

use serde::{Deserialize, Serialize};

use super::RatingTable;
use crate::error::{Error, Result};

/// Minimum number of subjects a table must contain.
const MIN_ROWS: usize = 2;

/// Minimum number of raters (columns).
const MIN_RATERS: usize = 2;

/// Integer category labels for each selected rater.
///
/// `ratings[r][i]` is the label rater `r` gave subject `i`. All raters rate
/// the same number of subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementInput {
    ratings: Vec<Vec<i64>>,
}

impl AgreementInput {
    /// Extract the requested columns from a table.
    ///
    /// Column indices are zero-based and their order defines rater order.
    /// Values are truncated toward zero to integer labels, so a rating of
    /// 2.9 becomes category 2 and -0.5 becomes category 0.
    pub fn select(table: &RatingTable, columns: &[usize]) -> Result<Self> {
        if table.row_count() < MIN_ROWS {
            return Err(Error::validation(
                format!("table must contain at least {MIN_ROWS} rows"),
                table.row_count(),
            ));
        }
        let available = table.column_count();
        if available < MIN_RATERS {
            return Err(Error::validation(
                format!("table must contain at least {MIN_RATERS} columns"),
                available,
            ));
        }
        if columns.len() < MIN_RATERS {
            return Err(Error::validation(
                format!("at least {MIN_RATERS} columns must be selected"),
                columns.len(),
            ));
        }
        if let Some(&bad) = columns.iter().find(|&&c| c >= available) {
            return Err(Error::validation(
                format!("column index must be below the {available} columns of the first row"),
                bad,
            ));
        }

        let highest = columns.iter().copied().max().unwrap_or(0);
        if let Some((row_idx, row)) = table
            .rows()
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() <= highest)
        {
            return Err(Error::validation(
                format!("row {} must contain column {highest}", row_idx + 1),
                format!("{} columns", row.len()),
            ));
        }

        let mut fractional = 0usize;
        let ratings: Vec<Vec<i64>> = columns
            .iter()
            .map(|&col| {
                table
                    .rows()
                    .iter()
                    .map(|row| {
                        let value = row[col];
                        if value.fract() != 0.0 {
                            fractional += 1;
                        }
                        value as i64
                    })
                    .collect()
            })
            .collect();

        if fractional > 0 {
            log::warn!("{fractional} fractional ratings truncated to integer categories");
        }
        log::debug!(
            "Selected columns {:?}: {} raters x {} subjects",
            columns,
            ratings.len(),
            table.row_count()
        );

        Ok(Self { ratings })
    }

    /// Build an input directly from per-rater label sequences.
    ///
    /// Requires at least two raters and at least one subject, with every
    /// rater rating the same subjects. Unlike [`select`](Self::select) a
    /// single subject is accepted; estimators that need more report it.
    pub fn from_ratings(ratings: Vec<Vec<i64>>) -> Result<Self> {
        if ratings.len() < MIN_RATERS {
            return Err(Error::validation(
                format!("at least {MIN_RATERS} raters are required"),
                ratings.len(),
            ));
        }
        let subjects = ratings[0].len();
        if subjects == 0 {
            return Err(Error::validation("at least 1 subject is required", 0));
        }
        if let Some((idx, r)) = ratings.iter().enumerate().find(|(_, r)| r.len() != subjects) {
            return Err(Error::validation(
                format!("rater {idx} must rate all {subjects} subjects"),
                r.len(),
            ));
        }
        Ok(Self { ratings })
    }

    /// Number of raters (R).
    #[must_use]
    pub fn rater_count(&self) -> usize {
        self.ratings.len()
    }

    /// Number of subjects (N).
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.ratings.first().map_or(0, Vec::len)
    }

    /// Labels given by each rater, in rater order.
    #[must_use]
    pub fn ratings(&self) -> &[Vec<i64>] {
        &self.ratings
    }

    /// Labels given to one subject, in rater order.
    pub fn subject(&self, idx: usize) -> impl Iterator<Item = i64> + '_ {
        self.ratings.iter().map(move |r| r[idx])
    }

    /// Every label in the input.
    pub fn labels(&self) -> impl Iterator<Item = i64> + '_ {
        self.ratings.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RatingTable {
        RatingTable::parse("0 1 2 9\n1 1 0 9\n2.9 -0.5 1 9\n")
    }

    #[test]
    fn test_select_reorders_and_truncates() {
        let input = AgreementInput::select(&sample(), &[1, 0]).unwrap();
        assert_eq!(input.rater_count(), 2);
        assert_eq!(input.subject_count(), 3);
        assert_eq!(input.ratings()[0], vec![1, 1, 0]);
        assert_eq!(input.ratings()[1], vec![0, 1, 2]);
        assert_eq!(input.subject(2).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_select_is_idempotent() {
        let table = sample();
        let a = AgreementInput::select(&table, &[0, 1, 2]).unwrap();
        let b = AgreementInput::select(&table.clone(), &[0, 1, 2]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_rows() {
        let err = AgreementInput::select(&RatingTable::parse("1 2\n"), &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("rows"));
    }

    #[test]
    fn test_empty_table() {
        let err = AgreementInput::select(&RatingTable::parse(""), &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_too_few_table_columns() {
        let err = AgreementInput::select(&RatingTable::parse("1\n2\n"), &[0, 0]).unwrap_err();
        assert!(err.to_string().contains("at least 2 columns"));
    }

    #[test]
    fn test_too_few_selected_columns() {
        let err = AgreementInput::select(&sample(), &[2]).unwrap_err();
        assert!(err.to_string().contains("selected"));
    }

    #[test]
    fn test_column_out_of_range() {
        let err = AgreementInput::select(&sample(), &[0, 4]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("4 columns"));
        assert!(msg.contains("got 4"));
    }

    #[test]
    fn test_short_row_rejected() {
        let table = RatingTable::parse("0 1 2\n1 1\n");
        let err = AgreementInput::select(&table, &[0, 2]).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_from_ratings_checks_shape() {
        assert!(AgreementInput::from_ratings(vec![vec![1, 2]]).is_err());
        assert!(AgreementInput::from_ratings(vec![vec![], vec![]]).is_err());
        assert!(AgreementInput::from_ratings(vec![vec![1, 2], vec![1]]).is_err());

        let single = AgreementInput::from_ratings(vec![vec![0], vec![1], vec![0]]).unwrap();
        assert_eq!(single.subject_count(), 1);
        assert_eq!(single.labels().count(), 3);
    }
}
