//! Kappa session: configuration and the load-select-tabulate-estimate run.
//!
//! A [`KappaSession`] holds only its [`KappaConfig`]; every run builds its
//! own count tables and weights, so one session can be shared freely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::{
    AgreementCounts, CategoryRange, ContingencyTable, DeviationRequest, FleissCounts, KappaResult,
    KappaTest, WeightMatrix, WeightScheme, cohen_kappa, fleiss_kappa,
};
use crate::table::{AgreementInput, RatingTable};

/// Configuration for a kappa computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KappaConfig {
    /// Which statistic to compute.
    pub test: KappaTest,

    /// Zero-based rater columns. For Cohen's kappa the first is rater 1.
    pub columns: Vec<usize>,

    /// Category weights for Cohen's kappa. Ignored by Fleiss' kappa.
    pub weights: WeightScheme,

    /// Whether to compute a standard deviation.
    pub std_dev: bool,

    /// Kappa to compare against. Switches the standard deviation from the
    /// null form to the non-null form.
    pub compare: Option<f64>,
}

impl KappaConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> KappaConfigBuilder {
        KappaConfigBuilder::default()
    }

    /// Standard deviations implied by the `std_dev` and `compare` settings.
    #[must_use]
    pub fn deviation_request(&self) -> DeviationRequest {
        match (self.std_dev, self.compare) {
            (false, _) => DeviationRequest::none(),
            (true, None) => DeviationRequest::null(),
            (true, Some(kappa)) => DeviationRequest::compare(kappa),
        }
    }
}

/// Builder for [`KappaConfig`].
#[derive(Debug, Default)]
pub struct KappaConfigBuilder {
    test: Option<KappaTest>,
    columns: Vec<usize>,
    weights: Option<WeightScheme>,
    std_dev: bool,
    compare: Option<f64>,
}

impl KappaConfigBuilder {
    /// Set the kappa test. Defaults to Fleiss.
    #[must_use]
    pub fn test(mut self, test: KappaTest) -> Self {
        self.test = Some(test);
        self
    }

    /// Set the rater columns.
    #[must_use]
    pub fn columns(mut self, columns: impl Into<Vec<usize>>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Set the Cohen weight scheme. Defaults to linear.
    #[must_use]
    pub fn weights(mut self, weights: WeightScheme) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Request a standard deviation.
    #[must_use]
    pub fn std_dev(mut self, enabled: bool) -> Self {
        self.std_dev = enabled;
        self
    }

    /// Set the kappa to compare against.
    #[must_use]
    pub fn compare(mut self, kappa: f64) -> Self {
        self.compare = Some(kappa);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> KappaConfig {
        KappaConfig {
            test: self.test.unwrap_or(KappaTest::Fleiss),
            columns: self.columns,
            weights: self.weights.unwrap_or_default(),
            std_dev: self.std_dev,
            compare: self.compare,
        }
    }
}

/// Count tables produced from a rating table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabulation {
    /// Category labels covered by the counts.
    pub categories: CategoryRange,
    /// Counts in the shape the test needs.
    pub counts: AgreementCounts,
}

/// Stateless kappa engine.
#[derive(Debug, Clone)]
pub struct KappaSession {
    config: KappaConfig,
}

impl KappaSession {
    /// Create a session for the given configuration.
    #[must_use]
    pub fn new(config: KappaConfig) -> Self {
        if config.compare.is_some() && !config.std_dev {
            log::warn!("comparison kappa given without standard deviation; it has no effect");
        }
        Self { config }
    }

    /// Get the session configuration.
    #[must_use]
    pub fn config(&self) -> &KappaConfig {
        &self.config
    }

    /// Select the configured columns and count agreements.
    pub fn tabulate(&self, table: &RatingTable) -> Result<Tabulation> {
        let input = AgreementInput::select(table, &self.config.columns)?;
        let categories = CategoryRange::scan(&input)?;
        log::debug!(
            "Categories {}..={} ({})",
            categories.min,
            categories.max,
            categories.count()
        );

        let counts = match self.config.test {
            KappaTest::Fleiss => {
                AgreementCounts::Fleiss(FleissCounts::tabulate(&input, &categories))
            }
            KappaTest::Cohen => {
                AgreementCounts::Cohen(ContingencyTable::tabulate(&input, &categories)?)
            }
        };
        Ok(Tabulation { categories, counts })
    }

    /// Compute the configured statistic for a rating table.
    pub fn run(&self, table: &RatingTable) -> Result<KappaResult> {
        let Tabulation { categories, counts } = self.tabulate(table)?;

        // A single category means every rating agrees by chance alone.
        if categories.count() < 2 {
            return Err(Error::DegenerateKappa {
                expected_agreement: 1.0,
            });
        }

        let request = self.config.deviation_request();
        let mut result = match counts {
            AgreementCounts::Fleiss(counts) => fleiss_kappa(&counts, request)?,
            AgreementCounts::Cohen(table) => {
                let weights = WeightMatrix::build(self.config.weights, categories.count())?;
                cohen_kappa(&table, &weights, request)?
            }
        };
        result.categories = Some(categories);
        Ok(result)
    }

    /// Load a rating table from `path` and compute the statistic.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<KappaResult> {
        let table = RatingTable::load(path)?;
        self.run(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FLEISS_SCENARIO: &str = "0 0 0\n1 1 1\n0 1 0\n";

    fn session(config: KappaConfig) -> KappaSession {
        KappaSession::new(config)
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = KappaConfig::builder().columns([0, 1]).build();
        assert_eq!(config.test, KappaTest::Fleiss);
        assert_eq!(config.weights, WeightScheme::Linear);
        assert!(!config.std_dev);
        assert_eq!(config.compare, None);
        assert_eq!(config.deviation_request(), DeviationRequest::none());
    }

    #[test]
    fn test_deviation_request_selection() {
        let null = KappaConfig::builder().std_dev(true).build();
        assert_eq!(null.deviation_request(), DeviationRequest::null());

        let compare = KappaConfig::builder().std_dev(true).compare(0.6).build();
        assert_eq!(compare.deviation_request(), DeviationRequest::compare(0.6));

        let ignored = KappaConfig::builder().compare(0.6).build();
        assert!(!ignored.deviation_request().any());
    }

    #[test]
    fn test_run_fleiss_scenario() {
        let config = KappaConfig::builder()
            .test(KappaTest::Fleiss)
            .columns([0, 1, 2])
            .build();
        let result = session(config).run(&RatingTable::parse(FLEISS_SCENARIO)).unwrap();
        assert!((result.kappa - 0.55).abs() < 1e-12);
        assert_eq!(result.categories, Some(CategoryRange::new(0, 1)));
    }

    #[test]
    fn test_run_cohen_scenario() {
        // Rows reproduce the contingency table [[5, 1], [2, 4]].
        let mut text = String::new();
        for (a, b, times) in [(0, 0, 5), (0, 1, 1), (1, 0, 2), (1, 1, 4)] {
            for _ in 0..times {
                text.push_str(&format!("{a} {b}\n"));
            }
        }
        let table = RatingTable::parse(&text);
        let config = KappaConfig::builder()
            .test(KappaTest::Cohen)
            .columns([0, 1])
            .weights(WeightScheme::Identity)
            .build();
        let result = session(config).run(&table).unwrap();
        assert!((result.kappa - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_run_cohen_swap_columns() {
        let table = RatingTable::parse("1 2\n2 2\n3 1\n1 1\n2 3\n3 3\n1 3\n");
        for &scheme in WeightScheme::all() {
            let forward = KappaConfig::builder()
                .test(KappaTest::Cohen)
                .columns([0, 1])
                .weights(scheme)
                .build();
            let backward = KappaConfig::builder()
                .test(KappaTest::Cohen)
                .columns([1, 0])
                .weights(scheme)
                .build();
            let a = session(forward).run(&table).unwrap();
            let b = session(backward).run(&table).unwrap();
            assert!((a.kappa - b.kappa).abs() < 1e-12, "{scheme}");
        }
    }

    #[test]
    fn test_cohen_needs_two_columns() {
        let config = KappaConfig::builder()
            .test(KappaTest::Cohen)
            .columns([0, 1, 2])
            .build();
        let err = session(config).run(&RatingTable::parse(FLEISS_SCENARIO)).unwrap_err();
        assert!(matches!(err, Error::ModeMismatch { raters: 3 }));
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let table = RatingTable::parse("2 2 2\n2 2 2\n2 2 2\n");
        for (test, columns) in [(KappaTest::Fleiss, vec![0, 1, 2]), (KappaTest::Cohen, vec![0, 1])] {
            let config = KappaConfig::builder().test(test).columns(columns).build();
            let err = session(config).run(&table).unwrap_err();
            assert!(matches!(err, Error::DegenerateKappa { .. }), "{test}");
        }
    }

    #[test]
    fn test_fleiss_two_raters_allowed() {
        // Subjects [0,0], [1,1], [0,1]: P = 2/3, p = (1/2, 1/2), Pe = 1/2.
        let config = KappaConfig::builder().columns([0, 1]).build();
        let result = session(config).run(&RatingTable::parse(FLEISS_SCENARIO)).unwrap();
        assert!((result.kappa - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.subjects, 3);
    }

    #[test]
    fn test_far_apart_labels_rejected() {
        for text in ["0 1e19\n0 1\n", "0 1e9\n1 0\n", "-9e18 9e18\n0 1\n"] {
            let table = RatingTable::parse(text);
            for test in [KappaTest::Fleiss, KappaTest::Cohen] {
                let config = KappaConfig::builder().test(test).columns([0, 1]).build();
                let err = session(config).run(&table).unwrap_err();
                assert!(matches!(err, Error::Validation { .. }), "{test}: {text:?}");
            }
        }
    }

    #[test]
    fn test_tabulate_is_repeatable() {
        let path = {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(FLEISS_SCENARIO.as_bytes()).unwrap();
            file.into_temp_path()
        };
        let s = session(KappaConfig::builder().columns([0, 1, 2]).build());
        let first = s.tabulate(&RatingTable::load(&path).unwrap()).unwrap();
        let second = s.tabulate(&RatingTable::load(&path).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_file_with_std() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLEISS_SCENARIO.as_bytes()).unwrap();

        let config = KappaConfig::builder()
            .columns([0, 1, 2])
            .std_dev(true)
            .build();
        let result = session(config).run_file(file.path()).unwrap();
        assert!((result.null_deviation.unwrap().std_dev - 1.0 / 3.0).abs() < 1e-12);
        assert!(result.compare_deviation.is_none());
    }

    #[test]
    fn test_run_file_missing() {
        let s = session(KappaConfig::builder().columns([0, 1]).build());
        let err = s.run_file("/nonexistent/ratings.txt").unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
