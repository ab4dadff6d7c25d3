use folioqp_types::{FolioQpError, Result, ReturnSeries};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::matrix_utils::{is_positive_definite, make_positive_definite, symmetrize};

const PD_EIGENVALUE_FLOOR: f64 = 1e-10;

/// Covariance estimation method
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceMethod {
    /// Sample covariance with `T - 1` denominator
    #[default]
    Pearson,
    /// `(1 - intensity) * S + intensity * diag(S)`
    DiagonalShrinkage { intensity: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CovarianceSpec {
    pub method: CovarianceMethod,
    pub check_positive_definite: bool,
}

/// Covariance estimator; keeps the last estimate when run in place
#[derive(Debug, Clone, Default)]
pub struct Covariance {
    pub spec: CovarianceSpec,
    pub matrix: Option<DMatrix<f64>>,
}

impl Covariance {
    pub fn new(spec: CovarianceSpec) -> Self {
        Covariance { spec, matrix: None }
    }

    pub fn estimate(&mut self, x: &ReturnSeries, inplace: bool) -> Result<DMatrix<f64>> {
        let t = x.num_periods();
        if t < 2 {
            return Err(FolioQpError::Dimension(format!(
                "covariance needs at least 2 periods, got {}",
                t
            )));
        }

        let values = x.values();
        let means = values.row_mean();
        let centered = DMatrix::from_fn(t, x.num_assets(), |i, j| values[(i, j)] - means[j]);
        let sample = symmetrize(&(centered.transpose() * &centered / (t as f64 - 1.0)));

        let mut matrix = match self.spec.method {
            CovarianceMethod::Pearson => sample,
            CovarianceMethod::DiagonalShrinkage { intensity } => {
                if !(0.0..=1.0).contains(&intensity) {
                    return Err(FolioQpError::ConfigError(format!(
                        "shrinkage intensity must lie in [0, 1], got {}",
                        intensity
                    )));
                }
                let target = DMatrix::from_diagonal(&sample.diagonal());
                sample * (1.0 - intensity) + target * intensity
            }
        };

        if self.spec.check_positive_definite && !is_positive_definite(&matrix) {
            tracing::warn!("covariance estimate is not positive definite, repairing");
            matrix = make_positive_definite(&matrix, PD_EIGENVALUE_FLOOR);
        }

        if inplace {
            self.matrix = Some(matrix.clone());
        }
        Ok(matrix)
    }
}
