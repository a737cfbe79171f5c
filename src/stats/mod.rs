//! Chance-corrected agreement statistics.
//!
//! ## Pipeline
//!
//! - [`CategoryRange`]: integer labels seen in the input
//! - [`FleissCounts`], [`ContingencyTable`]: count tables per test
//! - [`WeightMatrix`]: category weights for Cohen's kappa
//! - [`fleiss_kappa`], [`cohen_kappa`]: point estimates and standard deviations
//!
//! ## Example
//!
//! ```
//! use kappa_stat::stats::{ContingencyTable, DeviationRequest, WeightMatrix, WeightScheme, cohen_kappa};
//!
//! let table = ContingencyTable::from_counts(vec![vec![5, 1], vec![2, 4]]).unwrap();
//! let weights = WeightMatrix::build(WeightScheme::Identity, 2).unwrap();
//! let result = cohen_kappa(&table, &weights, DeviationRequest::none()).unwrap();
//! assert!((result.kappa - 0.5).abs() < 1e-12);
//! ```

mod kappa;
mod tabulate;
mod weights;

pub use kappa::{
    Deviation, DeviationRequest, KappaDetails, KappaResult, cohen_kappa, fleiss_kappa,
};
pub use tabulate::{
    AgreementCounts, CategoryRange, ContingencyTable, FleissCounts, MAX_CATEGORIES,
};
pub use weights::{WeightMatrix, WeightScheme};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which kappa statistic to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KappaTest {
    /// Fleiss' kappa: unweighted, two or more raters.
    Fleiss,
    /// Cohen's kappa: weighted, exactly two raters.
    Cohen,
}

impl KappaTest {
    /// Name used on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fleiss => "fleiss",
            Self::Cohen => "cohen",
        }
    }
}

impl FromStr for KappaTest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fleiss" => Ok(Self::Fleiss),
            "cohen" => Ok(Self::Cohen),
            _ => Err(Error::UnknownTest(s.to_string())),
        }
    }
}

impl fmt::Display for KappaTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
