//! Agreement tabulation: turns per-rater labels into count tables.
//!
//! Fleiss' kappa works from a subjects x categories table of how many raters
//! chose each category. Cohen's kappa works from a categories x categories
//! contingency table of the two raters' joint choices.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::AgreementInput;

/// Widest label range accepted from raw ratings.
///
/// A Cohen table holds K x K cells, so this also caps its allocation.
pub const MAX_CATEGORIES: usize = 1024;

/// Inclusive range of integer category labels seen in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    /// Smallest label.
    pub min: i64,
    /// Largest label.
    pub max: i64,
}

impl CategoryRange {
    /// Create a range from its bounds.
    #[must_use]
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Scan every label of the input for the smallest and largest.
    ///
    /// Fails when the labels span more than [`MAX_CATEGORIES`] categories.
    pub fn scan(input: &AgreementInput) -> Result<Self> {
        let (min, max) = input
            .labels()
            .fold((i64::MAX, i64::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)));
        let span = max.abs_diff(min);
        if span >= MAX_CATEGORIES as u64 {
            return Err(Error::validation(
                format!("category labels must span at most {MAX_CATEGORIES} values"),
                format!("{min}..={max}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// Number of categories, K = max - min + 1.
    #[must_use]
    pub fn count(&self) -> usize {
        usize::try_from(self.max.abs_diff(self.min))
            .map_or(usize::MAX, |span| span.saturating_add(1))
    }

    /// Zero-based category index of a label at or above `min`.
    #[must_use]
    pub fn index(&self, label: i64) -> usize {
        usize::try_from(label.abs_diff(self.min)).unwrap_or(usize::MAX)
    }

    /// Label of a zero-based category index.
    #[must_use]
    pub fn label(&self, index: usize) -> i64 {
        self.min + index as i64
    }

    /// All labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = i64> {
        self.min..=self.max
    }
}

/// Subjects x categories table for Fleiss' kappa.
///
/// Cell (i, j) counts the raters that put subject i in category j. Each row
/// sums to the rater count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleissCounts {
    raters: usize,
    counts: Vec<Vec<usize>>,
}

impl FleissCounts {
    /// Count category assignments per subject.
    #[must_use]
    pub fn tabulate(input: &AgreementInput, range: &CategoryRange) -> Self {
        let k = range.count();
        let counts = (0..input.subject_count())
            .map(|i| {
                let mut row = vec![0usize; k];
                for label in input.subject(i) {
                    row[range.index(label)] += 1;
                }
                row
            })
            .collect();
        Self {
            raters: input.rater_count(),
            counts,
        }
    }

    /// Build from an existing count table.
    ///
    /// Every row must have the same number of categories and sum to `raters`.
    pub fn from_counts(counts: Vec<Vec<usize>>, raters: usize) -> Result<Self> {
        if raters < 2 {
            return Err(Error::validation("at least 2 raters are required", raters));
        }
        let k = counts.first().map_or(0, Vec::len);
        if counts.is_empty() || k == 0 {
            return Err(Error::validation("count table must not be empty", 0));
        }
        for (i, row) in counts.iter().enumerate() {
            if row.len() != k {
                return Err(Error::validation(
                    format!("subject {i} must have {k} category counts"),
                    row.len(),
                ));
            }
            let sum: usize = row.iter().sum();
            if sum != raters {
                return Err(Error::validation(
                    format!("subject {i} counts must sum to {raters} raters"),
                    sum,
                ));
            }
        }
        Ok(Self { raters, counts })
    }

    /// Number of raters (R).
    #[must_use]
    pub fn rater_count(&self) -> usize {
        self.raters
    }

    /// Number of subjects (N).
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of categories (K).
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.counts.first().map_or(0, Vec::len)
    }

    /// Count rows, one per subject.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }
}

/// Categories x categories contingency table for Cohen's kappa.
///
/// Cell (a, b) counts subjects put in category a by rater 1 and category b
/// by rater 2. All cells sum to the subject count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    counts: Vec<Vec<usize>>,
}

impl ContingencyTable {
    /// Cross-tabulate the two raters' labels.
    pub fn tabulate(input: &AgreementInput, range: &CategoryRange) -> Result<Self> {
        if input.rater_count() != 2 {
            return Err(Error::ModeMismatch {
                raters: input.rater_count(),
            });
        }
        let k = range.count();
        let mut counts = vec![vec![0usize; k]; k];
        let ratings = input.ratings();
        for (&a, &b) in ratings[0].iter().zip(&ratings[1]) {
            counts[range.index(a)][range.index(b)] += 1;
        }
        Ok(Self { counts })
    }

    /// Build from an existing square count table.
    pub fn from_counts(counts: Vec<Vec<usize>>) -> Result<Self> {
        let k = counts.len();
        if k == 0 {
            return Err(Error::validation("contingency table must not be empty", 0));
        }
        if let Some(row) = counts.iter().find(|row| row.len() != k) {
            return Err(Error::validation(
                format!("contingency table must be {k}x{k}"),
                format!("a row of {}", row.len()),
            ));
        }
        let table = Self { counts };
        if table.subject_count() == 0 {
            return Err(Error::validation("contingency table must count at least 1 subject", 0));
        }
        Ok(table)
    }

    /// Number of subjects (N), the sum of all cells.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of categories (K).
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.counts.len()
    }

    /// Rows, indexed by rater 1's category.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// The same table with the raters exchanged.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let k = self.counts.len();
        let counts = (0..k)
            .map(|a| (0..k).map(|b| self.counts[b][a]).collect())
            .collect();
        Self { counts }
    }
}

/// Count table in the shape the chosen kappa test needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum AgreementCounts {
    /// Subjects x categories, for Fleiss' kappa.
    Fleiss(FleissCounts),
    /// Categories x categories, for Cohen's kappa.
    Cohen(ContingencyTable),
}

impl AgreementCounts {
    /// Number of subjects (N).
    #[must_use]
    pub fn subject_count(&self) -> usize {
        match self {
            Self::Fleiss(c) => c.subject_count(),
            Self::Cohen(c) => c.subject_count(),
        }
    }

    /// Raw count rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        match self {
            Self::Fleiss(c) => c.rows(),
            Self::Cohen(c) => c.rows(),
        }
    }
}
