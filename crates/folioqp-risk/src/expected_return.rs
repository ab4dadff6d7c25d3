use folioqp_types::{FolioQpError, Result, ReturnSeries};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedReturnMethod {
    Arithmetic,
    /// `(prod(1 + r))^(1/T) - 1`
    #[default]
    Geometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpectedReturnSpec {
    pub method: ExpectedReturnMethod,
    /// Multiplier applied to the per-period estimate (e.g. 252 to annualise)
    pub scalefactor: f64,
}

impl Default for ExpectedReturnSpec {
    fn default() -> Self {
        ExpectedReturnSpec {
            method: ExpectedReturnMethod::default(),
            scalefactor: 1.0,
        }
    }
}

/// Expected return estimator; keeps the last estimate when run in place
#[derive(Debug, Clone, Default)]
pub struct ExpectedReturn {
    pub spec: ExpectedReturnSpec,
    pub vector: Option<DVector<f64>>,
}

impl ExpectedReturn {
    pub fn new(spec: ExpectedReturnSpec) -> Self {
        ExpectedReturn { spec, vector: None }
    }

    pub fn estimate(&mut self, x: &ReturnSeries, inplace: bool) -> Result<DVector<f64>> {
        let t = x.num_periods();
        if t == 0 {
            return Err(FolioQpError::Dimension(
                "expected return needs at least one period".to_string(),
            ));
        }

        let mu = match self.spec.method {
            ExpectedReturnMethod::Arithmetic => x.values().row_mean().transpose(),
            ExpectedReturnMethod::Geometric => {
                if x.values().iter().any(|&r| r <= -1.0) {
                    return Err(FolioQpError::Numerical(
                        "geometric mean undefined for returns <= -100%".to_string(),
                    ));
                }
                x.log_transform()
                    .values()
                    .row_mean()
                    .transpose()
                    .map(f64::exp_m1)
            }
        };
        let mu = mu * self.spec.scalefactor;

        if inplace {
            self.vector = Some(mu.clone());
        }
        Ok(mu)
    }
}
