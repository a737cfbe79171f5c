//! Report rendering for kappa results.
//!
//! Text reports come in three levels:
//!
//! - `kappa`: the point estimate alone
//! - `all`: the estimate plus any standard deviations and z statistics
//! - `ALL`: everything above plus the count tables and marginals
//!
//! [`to_json`] and [`write_counts_csv`] give machine-readable output.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Tabulation;
use crate::stats::{AgreementCounts, CategoryRange, Deviation, KappaDetails, KappaResult};

/// Default number of decimals.
pub const DEFAULT_PRECISION: usize = 8;

/// How much of a result to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Only the point estimate.
    #[serde(rename = "kappa")]
    Kappa,
    /// Point estimate and standard deviations.
    #[default]
    #[serde(rename = "all")]
    All,
    /// Everything, including intermediate tables.
    #[serde(rename = "ALL")]
    Full,
}

impl Verbosity {
    /// Name used on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Kappa => "kappa",
            Self::All => "all",
            Self::Full => "ALL",
        }
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    // Case matters: "all" and "ALL" are different levels.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kappa" => Ok(Self::Kappa),
            "all" => Ok(Self::All),
            "ALL" => Ok(Self::Full),
            _ => Err(Error::UnknownVerbosity(s.to_string())),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for text reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Output level.
    pub verbosity: Verbosity,
    /// Decimal places for real numbers.
    pub precision: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

/// A result paired with report options; formats via [`fmt::Display`].
pub struct Report<'a> {
    result: &'a KappaResult,
    options: ReportOptions,
}

impl<'a> Report<'a> {
    /// Wrap a result for display.
    #[must_use]
    pub fn new(result: &'a KappaResult, options: ReportOptions) -> Self {
        Self { result, options }
    }
}

/// Render a result as text.
#[must_use]
pub fn format_report(result: &KappaResult, options: ReportOptions) -> String {
    Report::new(result, options).to_string()
}

/// Serialize a result as pretty-printed JSON.
pub fn to_json(result: &KappaResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write the count table of a tabulation as CSV.
///
/// The header names the raw category labels. Fleiss tables get one row per
/// subject, Cohen tables one row per rater-1 category.
pub fn write_counts_csv<W: io::Write>(tabulation: &Tabulation, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let labels: Vec<String> = tabulation
        .categories
        .labels()
        .map(|l| l.to_string())
        .collect();

    let cohen = matches!(tabulation.counts, AgreementCounts::Cohen(_));
    let corner = if cohen { "rater1\\rater2" } else { "subject" };

    let mut header = vec![corner.to_string()];
    header.extend(labels);
    wtr.write_record(&header)?;

    for (i, row) in tabulation.counts.rows().iter().enumerate() {
        let row_label = if cohen {
            tabulation.categories.label(i).to_string()
        } else {
            i.to_string()
        };
        let mut record = vec![row_label];
        record.extend(row.iter().map(|c| c.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.options.precision;
        let r = self.result;

        if self.options.verbosity == Verbosity::Kappa {
            return writeln!(f, "{:.*}", p, r.kappa);
        }

        if self.options.verbosity == Verbosity::Full {
            writeln!(f, "{:<24}{}", "test:", r.test)?;
            writeln!(f, "{:<24}{}", "subjects:", r.subjects)?;
            if let Some(c) = &r.categories {
                writeln!(f, "{:<24}{} .. {} ({})", "categories:", c.min, c.max, c.count())?;
            }
        }

        writeln!(f, "{:<24}{:.*}", "kappa:", p, r.kappa)?;
        if let Some(dev) = &r.null_deviation {
            write_deviation(f, "kappa = 0", dev, p)?;
        }
        if let Some(dev) = &r.compare_deviation {
            write_deviation(f, &format!("kappa = {}", dev.reference), dev, p)?;
        }

        if self.options.verbosity == Verbosity::Full {
            writeln!(f)?;
            write_details(f, &r.details, r.categories.as_ref(), p)?;
        }
        Ok(())
    }
}

fn write_deviation(
    f: &mut fmt::Formatter<'_>,
    hypothesis: &str,
    dev: &Deviation,
    p: usize,
) -> fmt::Result {
    writeln!(f, "{:<24}{:.*}", format!("std ({hypothesis}):"), p, dev.std_dev)?;
    match dev.z {
        Some(z) => writeln!(f, "{:<24}{:.*}", format!("z ({hypothesis}):"), p, z),
        None => writeln!(f, "{:<24}-", format!("z ({hypothesis}):")),
    }
}

/// Category label for column `idx`, falling back to the index itself.
fn label(categories: Option<&CategoryRange>, idx: usize) -> String {
    categories.map_or_else(|| idx.to_string(), |c| c.label(idx).to_string())
}

fn write_details(
    f: &mut fmt::Formatter<'_>,
    details: &KappaDetails,
    categories: Option<&CategoryRange>,
    p: usize,
) -> fmt::Result {
    let width = p + 4;
    match details {
        KappaDetails::Fleiss {
            counts,
            category_proportions,
            subject_agreement,
            mean_agreement,
            expected_agreement,
        } => {
            writeln!(f, "{:<24}{:.*}", "observed agreement:", p, mean_agreement)?;
            writeln!(f, "{:<24}{:.*}", "expected agreement:", p, expected_agreement)?;
            writeln!(f)?;

            writeln!(f, "Category proportions (p_j):")?;
            for (j, pj) in category_proportions.iter().enumerate() {
                writeln!(f, "  {:>8}  {:.*}", label(categories, j), p, pj)?;
            }
            writeln!(f)?;

            writeln!(f, "Counts per subject and agreement (P_i):")?;
            write!(f, "  {:>8}", "subject")?;
            for j in 0..counts.category_count() {
                write!(f, " {:>6}", label(categories, j))?;
            }
            writeln!(f, "  {:>width$}", "P_i")?;
            writeln!(f, "  {:-<1$}", "", 8 + 7 * counts.category_count() + width + 2)?;
            for (i, (row, pi)) in counts.rows().iter().zip(subject_agreement).enumerate() {
                write!(f, "  {:>8}", i)?;
                for c in row {
                    write!(f, " {:>6}", c)?;
                }
                writeln!(f, "  {:>width$.p$}", pi)?;
            }
        }
        KappaDetails::Cohen {
            table,
            weights,
            row_marginals,
            column_marginals,
            observed_agreement,
            expected_agreement,
        } => {
            writeln!(f, "{:<24}{}", "weights:", weights.scheme())?;
            writeln!(f, "{:<24}{:.*}", "observed agreement:", p, observed_agreement)?;
            writeln!(f, "{:<24}{:.*}", "expected agreement:", p, expected_agreement)?;
            writeln!(f)?;

            let k = table.category_count();
            writeln!(f, "Contingency table (rows: rater 1, columns: rater 2):")?;
            write!(f, "  {:>8}", "")?;
            for b in 0..k {
                write!(f, " {:>6}", label(categories, b))?;
            }
            writeln!(f, "  {:>width$}", "marginal")?;
            for (a, row) in table.rows().iter().enumerate() {
                write!(f, "  {:>8}", label(categories, a))?;
                for c in row {
                    write!(f, " {:>6}", c)?;
                }
                writeln!(f, "  {:>width$.p$}", row_marginals[a])?;
            }
            write!(f, "  {:>8}", "marginal")?;
            for c in column_marginals {
                write!(f, " {:.*}", p, c)?;
            }
            writeln!(f)?;
            writeln!(f)?;

            writeln!(f, "Weight matrix:")?;
            for (a, row) in weights.rows().iter().enumerate() {
                write!(f, "  {:>8}", label(categories, a))?;
                for w in row {
                    write!(f, " {:.*}", p, w)?;
                }
                writeln!(f)?;
            }
        }
    }
    Ok(())
}
