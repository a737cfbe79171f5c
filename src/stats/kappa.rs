//! Kappa point estimates and their large-sample standard deviations.
//!
//! Both estimators share the shape `(observed - expected) / (1 - expected)`.
//! When expected agreement reaches one the statistic is undefined and
//! [`Error::DegenerateKappa`] is returned instead of a number.
//!
//! Standard deviations come in two flavours that must not be mixed up:
//!
//! - **null**: the variance assuming true kappa is zero, used to test
//!   whether there is any agreement beyond chance.
//! - **compare**: the non-null variance, evaluated at the estimate, used to
//!   test the estimate against a supplied nonzero value.
//!
//! Both share no formula body: the null variance is built from marginals
//! alone, the non-null one from the observed cells.
//!
//! References: Fleiss (1971); Fleiss, Nee & Landis (1979) for the Fleiss
//! null variance; Fleiss, Cohen & Everitt (1969) for weighted Cohen kappa.

use serde::{Deserialize, Serialize};

use super::KappaTest;
use super::tabulate::{CategoryRange, ContingencyTable, FleissCounts};
use super::weights::WeightMatrix;
use crate::error::{Error, Result};

/// Expected agreement this close to one counts as degenerate.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Subjects needed for a standard deviation.
const MIN_SUBJECTS_FOR_STD: usize = 2;

/// Which standard deviations to compute alongside the point estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviationRequest {
    /// Standard deviation under the hypothesis kappa = 0.
    pub null: bool,
    /// Non-null standard deviation, for testing against this value.
    pub compare: Option<f64>,
}

impl DeviationRequest {
    /// No standard deviation.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Only the null-hypothesis standard deviation.
    #[must_use]
    pub fn null() -> Self {
        Self {
            null: true,
            compare: None,
        }
    }

    /// Only the non-null standard deviation, tested against `kappa`.
    ///
    /// The variance is evaluated at the estimate; `kappa` only enters the
    /// z statistic.
    #[must_use]
    pub fn compare(kappa: f64) -> Self {
        Self {
            null: false,
            compare: Some(kappa),
        }
    }

    /// Whether any standard deviation is requested.
    #[must_use]
    pub fn any(&self) -> bool {
        self.null || self.compare.is_some()
    }
}

/// A standard deviation and the test statistic it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Hypothesised kappa (0 for the null hypothesis).
    pub reference: f64,
    /// Large-sample standard deviation of kappa under that hypothesis.
    pub std_dev: f64,
    /// `(kappa - reference) / std_dev`, absent when `std_dev` is zero.
    pub z: Option<f64>,
}

impl Deviation {
    fn new(kappa: f64, reference: f64, variance: f64) -> Self {
        let std_dev = variance.max(0.0).sqrt();
        let z = (std_dev > 0.0).then(|| (kappa - reference) / std_dev);
        Self {
            reference,
            std_dev,
            z,
        }
    }
}

/// Intermediate quantities behind a kappa estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum KappaDetails {
    /// Fleiss' kappa intermediates.
    Fleiss {
        /// Subjects x categories counts.
        counts: FleissCounts,
        /// p_j: share of all ratings in each category.
        category_proportions: Vec<f64>,
        /// P_i: observed agreement per subject.
        subject_agreement: Vec<f64>,
        /// Mean of P_i.
        mean_agreement: f64,
        /// Sum of p_j squared.
        expected_agreement: f64,
    },
    /// Weighted Cohen's kappa intermediates.
    Cohen {
        /// Categories x categories counts.
        table: ContingencyTable,
        /// Weight matrix applied to the table.
        weights: WeightMatrix,
        /// Rater 1 category proportions.
        row_marginals: Vec<f64>,
        /// Rater 2 category proportions.
        column_marginals: Vec<f64>,
        /// Weighted observed agreement.
        observed_agreement: f64,
        /// Weighted agreement expected by chance.
        expected_agreement: f64,
    },
}

/// Outcome of a kappa computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KappaResult {
    /// Which statistic was computed.
    pub test: KappaTest,
    /// Point estimate. Not clamped.
    pub kappa: f64,
    /// Number of subjects (N).
    pub subjects: usize,
    /// Category labels covered, when the counts came from raw labels.
    pub categories: Option<CategoryRange>,
    /// Standard deviation under kappa = 0, if requested.
    pub null_deviation: Option<Deviation>,
    /// Non-null standard deviation against the comparison value, if requested.
    pub compare_deviation: Option<Deviation>,
    /// Intermediate tables and agreement values.
    pub details: KappaDetails,
}

/// Compute Fleiss' kappa from per-subject category counts.
pub fn fleiss_kappa(counts: &FleissCounts, request: DeviationRequest) -> Result<KappaResult> {
    let n = counts.subject_count();
    let r = counts.rater_count() as f64;
    let k = counts.category_count();
    let total = n as f64 * r;

    let category_proportions: Vec<f64> = (0..k)
        .map(|j| counts.rows().iter().map(|row| row[j]).sum::<usize>() as f64 / total)
        .collect();

    let subject_agreement: Vec<f64> = counts
        .rows()
        .iter()
        .map(|row| {
            let squares: f64 = row.iter().map(|&c| (c * c) as f64).sum();
            (squares - r) / (r * (r - 1.0))
        })
        .collect();

    let mean_agreement = subject_agreement.iter().sum::<f64>() / n as f64;
    let expected_agreement: f64 = category_proportions.iter().map(|p| p * p).sum();

    check_sample_size(n, request)?;
    let kappa = chance_corrected(mean_agreement, expected_agreement)?;
    log::debug!(
        "Fleiss: N={n}, R={r}, K={k}, P={mean_agreement}, Pe={expected_agreement}, kappa={kappa}"
    );

    let null_deviation = request.null.then(|| {
        Deviation::new(
            kappa,
            0.0,
            fleiss_null_variance(&category_proportions, n, r),
        )
    });
    let compare_deviation = request.compare.map(|reference| {
        Deviation::new(
            kappa,
            reference,
            fleiss_compare_variance(&subject_agreement, mean_agreement, expected_agreement),
        )
    });

    Ok(KappaResult {
        test: KappaTest::Fleiss,
        kappa,
        subjects: n,
        categories: None,
        null_deviation,
        compare_deviation,
        details: KappaDetails::Fleiss {
            counts: counts.clone(),
            category_proportions,
            subject_agreement,
            mean_agreement,
            expected_agreement,
        },
    })
}

/// Compute weighted Cohen's kappa from a two-rater contingency table.
pub fn cohen_kappa(
    table: &ContingencyTable,
    weights: &WeightMatrix,
    request: DeviationRequest,
) -> Result<KappaResult> {
    let k = table.category_count();
    if weights.size() != k {
        return Err(Error::validation(
            format!("weight matrix must match the {k} table categories"),
            weights.size(),
        ));
    }
    let n = table.subject_count();
    let nf = n as f64;
    let rows = table.rows();

    let row_marginals: Vec<f64> = rows
        .iter()
        .map(|row| row.iter().sum::<usize>() as f64 / nf)
        .collect();
    let column_marginals: Vec<f64> = (0..k)
        .map(|b| rows.iter().map(|row| row[b]).sum::<usize>() as f64 / nf)
        .collect();

    let mut observed_agreement = 0.0;
    let mut expected_agreement = 0.0;
    for a in 0..k {
        for b in 0..k {
            let w = weights.get(a, b);
            observed_agreement += w * rows[a][b] as f64 / nf;
            expected_agreement += w * row_marginals[a] * column_marginals[b];
        }
    }

    check_sample_size(n, request)?;
    let kappa = chance_corrected(observed_agreement, expected_agreement)?;
    log::debug!(
        "Cohen ({}): N={n}, K={k}, Po={observed_agreement}, Pe={expected_agreement}, kappa={kappa}",
        weights.scheme()
    );

    let marginals = Marginals {
        rows: &row_marginals,
        columns: &column_marginals,
        expected: expected_agreement,
    };
    let null_deviation = request
        .null
        .then(|| Deviation::new(kappa, 0.0, cohen_null_variance(weights, &marginals, nf)));
    let compare_deviation = request.compare.map(|reference| {
        Deviation::new(
            kappa,
            reference,
            cohen_compare_variance(table, weights, &marginals, kappa),
        )
    });

    Ok(KappaResult {
        test: KappaTest::Cohen,
        kappa,
        subjects: n,
        categories: None,
        null_deviation,
        compare_deviation,
        details: KappaDetails::Cohen {
            table: table.clone(),
            weights: weights.clone(),
            row_marginals,
            column_marginals,
            observed_agreement,
            expected_agreement,
        },
    })
}

/// `(observed - expected) / (1 - expected)`, or an error if undefined.
fn chance_corrected(observed: f64, expected: f64) -> Result<f64> {
    if 1.0 - expected <= DEGENERATE_TOLERANCE {
        return Err(Error::DegenerateKappa {
            expected_agreement: expected,
        });
    }
    Ok((observed - expected) / (1.0 - expected))
}

fn check_sample_size(subjects: usize, request: DeviationRequest) -> Result<()> {
    if request.any() && subjects < MIN_SUBJECTS_FOR_STD {
        return Err(Error::InsufficientData {
            subjects,
            required: MIN_SUBJECTS_FOR_STD,
        });
    }
    Ok(())
}

/// Fleiss, Nee & Landis (1979) variance of kappa when true kappa is zero.
fn fleiss_null_variance(proportions: &[f64], n: usize, r: f64) -> f64 {
    let pq: f64 = proportions.iter().map(|p| p * (1.0 - p)).sum();
    let skew: f64 = proportions
        .iter()
        .map(|p| {
            let q = 1.0 - p;
            p * q * (q - p)
        })
        .sum();
    2.0 / (n as f64 * r * (r - 1.0)) * (pq * pq - skew) / (pq * pq)
}

/// Variance of kappa from the spread of per-subject agreement.
///
/// Only P-bar varies from sample to sample here; the chance term is
/// treated as fixed.
fn fleiss_compare_variance(subject_agreement: &[f64], mean: f64, expected: f64) -> f64 {
    let n = subject_agreement.len() as f64;
    let spread: f64 = subject_agreement.iter().map(|p| (p - mean).powi(2)).sum();
    spread / (n * (n - 1.0) * (1.0 - expected).powi(2))
}

struct Marginals<'a> {
    rows: &'a [f64],
    columns: &'a [f64],
    expected: f64,
}

impl Marginals<'_> {
    /// Weighted row mean against the column marginals, `sum_b c_b w_ab`.
    fn row_weight(&self, weights: &WeightMatrix, a: usize) -> f64 {
        (0..self.columns.len())
            .map(|b| self.columns[b] * weights.get(a, b))
            .sum()
    }

    /// Weighted column mean against the row marginals, `sum_a r_a w_ab`.
    fn column_weight(&self, weights: &WeightMatrix, b: usize) -> f64 {
        (0..self.rows.len())
            .map(|a| self.rows[a] * weights.get(a, b))
            .sum()
    }
}

/// Fleiss, Cohen & Everitt (1969) variance when true kappa is zero.
///
/// Cells are weighted by the product of marginals: under independence that
/// is the joint distribution.
fn cohen_null_variance(weights: &WeightMatrix, m: &Marginals<'_>, n: f64) -> f64 {
    let k = weights.size();
    let row_w: Vec<f64> = (0..k).map(|a| m.row_weight(weights, a)).collect();
    let col_w: Vec<f64> = (0..k).map(|b| m.column_weight(weights, b)).collect();

    let mut sum = 0.0;
    for a in 0..k {
        for b in 0..k {
            let dev = weights.get(a, b) - (row_w[a] + col_w[b]);
            sum += m.rows[a] * m.columns[b] * dev * dev;
        }
    }
    (sum - m.expected * m.expected) / (n * (1.0 - m.expected).powi(2))
}

/// Fleiss, Cohen & Everitt (1969) non-null variance at the estimate `kappa`.
///
/// Cells are weighted by the observed joint proportions.
fn cohen_compare_variance(
    table: &ContingencyTable,
    weights: &WeightMatrix,
    m: &Marginals<'_>,
    kappa: f64,
) -> f64 {
    let k = weights.size();
    let n = table.subject_count() as f64;
    let shrink = 1.0 - kappa;
    let row_w: Vec<f64> = (0..k).map(|a| m.row_weight(weights, a)).collect();
    let col_w: Vec<f64> = (0..k).map(|b| m.column_weight(weights, b)).collect();

    let mut sum = 0.0;
    for a in 0..k {
        for b in 0..k {
            let p = table.rows()[a][b] as f64 / n;
            let dev = weights.get(a, b) - (row_w[a] + col_w[b]) * shrink;
            sum += p * dev * dev;
        }
    }
    let offset = kappa - m.expected * shrink;
    (sum - offset * offset) / (n * (1.0 - m.expected).powi(2))
}
