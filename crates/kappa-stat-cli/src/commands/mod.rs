//! Subcommand implementations.

pub mod compute;
pub mod counts;

use anyhow::{Context, Result};
use kappa_stat::{KappaConfig, KappaTest, WeightScheme};

use crate::InputArgs;

/// Build a kappa configuration from the shared input arguments.
fn config_from(input: &InputArgs, std_dev: bool, compare: Option<f64>) -> Result<KappaConfig> {
    let test: KappaTest = input
        .test
        .parse()
        .with_context(|| format!("Invalid --test value {:?}", input.test))?;
    let weights: WeightScheme = input
        .weights
        .parse()
        .with_context(|| format!("Invalid --weights value {:?}", input.weights))?;

    let mut builder = KappaConfig::builder()
        .test(test)
        .columns(input.columns.clone())
        .weights(weights)
        .std_dev(std_dev);
    if let Some(kappa) = compare {
        builder = builder.compare(kappa);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(test: &str, weights: &str) -> InputArgs {
        InputArgs {
            input: PathBuf::from("ratings.txt"),
            test: test.to_string(),
            columns: vec![0, 1],
            weights: weights.to_string(),
        }
    }

    #[test]
    fn test_config_from_args() {
        let config = config_from(&args("cohen", "quadratic"), true, Some(0.4)).unwrap();
        assert_eq!(config.test, KappaTest::Cohen);
        assert_eq!(config.weights, WeightScheme::Quadratic);
        assert_eq!(config.columns, vec![0, 1]);
        assert!(config.std_dev);
        assert_eq!(config.compare, Some(0.4));
    }

    #[test]
    fn test_unknown_weight_scheme() {
        let err = config_from(&args("cohen", "cubic"), false, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<kappa_stat::Error>(),
            Some(kappa_stat::Error::UnknownWeightScheme(_))
        ));
    }

    #[test]
    fn test_unknown_test() {
        let err = config_from(&args("scott", "linear"), false, None).unwrap_err();
        assert!(format!("{:#}", err).contains("scott"));
    }
}
