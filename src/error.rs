//! Error types for kappa-stat operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kappa-stat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing an agreement statistic.
///
/// Every variant is detected by the stage that first sees the violated
/// precondition and is passed through unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input table could not be opened or read.
    #[error("Failed to read rating table {path}: {source}")]
    Load {
        /// Path of the table file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The table or column selection violates a shape constraint.
    #[error("Invalid rating table: {constraint} (got {actual})")]
    Validation {
        /// The constraint that failed.
        constraint: String,
        /// The offending value.
        actual: String,
    },

    /// Cohen's kappa requested with a rater count other than two.
    #[error("Cohen's kappa needs exactly 2 raters, got {raters}")]
    ModeMismatch {
        /// Number of rater columns supplied.
        raters: usize,
    },

    /// Weight scheme name is not one of linear, quadratic, identity.
    #[error("Unknown weight scheme: {0:?} (expected linear, quadratic or identity)")]
    UnknownWeightScheme(String),

    /// Test name is not one of fleiss, cohen.
    #[error("Unknown kappa test: {0:?} (expected fleiss or cohen)")]
    UnknownTest(String),

    /// Output level is not one of kappa, all, ALL.
    #[error("Unknown output level: {0:?} (expected kappa, all or ALL)")]
    UnknownVerbosity(String),

    /// Expected agreement equals one, so kappa is undefined.
    #[error("Kappa is undefined: expected agreement is {expected_agreement} (all ratings fall in one category)")]
    DegenerateKappa {
        /// The expected (chance) agreement that made the denominator vanish.
        expected_agreement: f64,
    },

    /// Too few subjects to estimate a standard deviation.
    #[error("Standard deviation needs at least {required} subjects, got {subjects}")]
    InsufficientData {
        /// Number of subjects available.
        subjects: usize,
        /// Minimum number of subjects.
        required: usize,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a [`Error::Validation`] from a constraint and the offending value.
    pub(crate) fn validation(constraint: impl Into<String>, actual: impl ToString) -> Self {
        Self::Validation {
            constraint: constraint.into(),
            actual: actual.to_string(),
        }
    }

    /// Short stable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Validation { .. } => "validation",
            Self::ModeMismatch { .. } => "mode-mismatch",
            Self::UnknownWeightScheme(_) => "unknown-weight-scheme",
            Self::UnknownTest(_) => "unknown-test",
            Self::UnknownVerbosity(_) => "unknown-verbosity",
            Self::DegenerateKappa { .. } => "degenerate-kappa",
            Self::InsufficientData { .. } => "insufficient-data",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Csv(_) => "csv",
        }
    }
}
