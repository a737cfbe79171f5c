//! Category weighting for Cohen's kappa.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How much agreement credit two different categories earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    /// `1 - |a - b| / (k - 1)`
    #[default]
    Linear,
    /// `1 - ((a - b) / (k - 1))^2`
    Quadratic,
    /// Full credit on the diagonal only (unweighted kappa).
    Identity,
}

impl WeightScheme {
    /// Get all scheme variants.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Linear, Self::Quadratic, Self::Identity]
    }

    /// Name used on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Identity => "identity",
        }
    }

    /// Weight of the category pair (a, b) out of `k` categories.
    fn weight(self, a: usize, b: usize, k: usize) -> f64 {
        let span = (k - 1) as f64;
        let distance = a.abs_diff(b) as f64;
        match self {
            Self::Identity => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Linear => 1.0 - distance / span,
            Self::Quadratic => 1.0 - (distance / span).powi(2),
        }
    }
}

impl FromStr for WeightScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| Error::UnknownWeightScheme(s.to_string()))
    }
}

impl fmt::Display for WeightScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Symmetric K x K matrix of agreement credits in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    scheme: WeightScheme,
    weights: Vec<Vec<f64>>,
}

impl WeightMatrix {
    /// Build the matrix for `k` categories.
    ///
    /// `k` must be at least 2; a single category leaves nothing to weight.
    pub fn build(scheme: WeightScheme, k: usize) -> Result<Self> {
        if k < 2 {
            return Err(Error::validation("weight matrix needs at least 2 categories", k));
        }
        let weights = (0..k)
            .map(|a| (0..k).map(|b| scheme.weight(a, b, k)).collect())
            .collect();
        Ok(Self { scheme, weights })
    }

    /// Scheme the matrix was built from.
    #[must_use]
    pub fn scheme(&self) -> WeightScheme {
        self.scheme
    }

    /// Number of categories (K).
    #[must_use]
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// Weight of category pair (a, b).
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.weights[a][b]
    }

    /// Matrix rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme() {
        assert_eq!("linear".parse::<WeightScheme>().unwrap(), WeightScheme::Linear);
        assert_eq!("quadratic".parse::<WeightScheme>().unwrap(), WeightScheme::Quadratic);
        assert_eq!("identity".parse::<WeightScheme>().unwrap(), WeightScheme::Identity);
        assert_eq!(WeightScheme::default(), WeightScheme::Linear);

        let err = "cubic".parse::<WeightScheme>().unwrap_err();
        assert!(matches!(err, Error::UnknownWeightScheme(ref s) if s == "cubic"));
    }

    #[test]
    fn test_identity_matrix() {
        let w = WeightMatrix::build(WeightScheme::Identity, 3).unwrap();
        for a in 0..3 {
            for b in 0..3 {
                assert_eq!(w.get(a, b), if a == b { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_linear_matrix() {
        let w = WeightMatrix::build(WeightScheme::Linear, 3).unwrap();
        assert_eq!(w.rows()[0], vec![1.0, 0.5, 0.0]);
        assert_eq!(w.rows()[1], vec![0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_quadratic_matrix() {
        let w = WeightMatrix::build(WeightScheme::Quadratic, 3).unwrap();
        assert_eq!(w.rows()[0], vec![1.0, 0.75, 0.0]);
        assert_eq!(w.get(2, 1), 0.75);
    }

    #[test]
    fn test_matrices_symmetric_in_unit_range() {
        for &scheme in WeightScheme::all() {
            let w = WeightMatrix::build(scheme, 5).unwrap();
            assert_eq!(w.size(), 5);
            for a in 0..5 {
                assert_eq!(w.get(a, a), 1.0);
                for b in 0..5 {
                    assert_eq!(w.get(a, b), w.get(b, a));
                    assert!((0.0..=1.0).contains(&w.get(a, b)));
                }
            }
        }
    }

    #[test]
    fn test_single_category_rejected() {
        assert!(WeightMatrix::build(WeightScheme::Linear, 1).is_err());
    }
}
