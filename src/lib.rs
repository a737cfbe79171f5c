//! # kappa-stat
//!
//! Inter-rater agreement statistics.
//!
//! Given a table of categorical ratings (one row per subject, one column per
//! rater) this library computes a chance-corrected agreement statistic:
//! Fleiss' kappa for two or more raters, or Cohen's kappa (optionally
//! weighted) for exactly two. Each estimate can come with a large-sample
//! standard deviation, either under the null hypothesis kappa = 0 or for
//! testing against a supplied comparison value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kappa_stat::{KappaConfig, KappaSession, KappaTest, ReportOptions, format_report};
//!
//! let config = KappaConfig::builder()
//!     .test(KappaTest::Fleiss)
//!     .columns([0, 1, 2])
//!     .std_dev(true)
//!     .build();
//!
//! let result = KappaSession::new(config).run_file("ratings.txt")?;
//! print!("{}", format_report(&result, ReportOptions::default()));
//! # Ok::<(), kappa_stat::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`table`]: Rating table loading and rater column selection
//! - [`stats`]: Count tables, weights and kappa estimators
//! - [`session`]: Configuration and the end-to-end computation
//! - [`report`]: Text, JSON and CSV output

pub mod error;
pub mod report;
pub mod session;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use error::{Error, Result};
pub use report::{ReportOptions, Verbosity, format_report, to_json, write_counts_csv};
pub use session::{KappaConfig, KappaSession, Tabulation};
pub use stats::{
    AgreementCounts, CategoryRange, ContingencyTable, Deviation, DeviationRequest, FleissCounts,
    KappaDetails, KappaResult, KappaTest, WeightMatrix, WeightScheme,
};
pub use table::{AgreementInput, RatingTable};
