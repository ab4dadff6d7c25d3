use folioqp_constraints::Constraints;
use folioqp_solver::SolverBackend;
use folioqp_types::{FolioQpError, OptimizationData, Result};
use nalgebra::DMatrix;
use std::sync::Arc;

use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore};
use crate::params::{LeastSquaresConfig, OptimizationParams};

/// Benchmark tracking by least squares:
/// `min ||X x - y||^2 + lambda ||x||^2`
pub struct LeastSquares {
    core: OptimizationCore,
    config: LeastSquaresConfig,
}

impl LeastSquares {
    pub fn new(
        params: OptimizationParams,
        config: LeastSquaresConfig,
        constraints: Constraints,
    ) -> Result<Self> {
        config.validate()?;
        Ok(LeastSquares {
            core: OptimizationCore::new(params, constraints, false)?,
            config,
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.core.set_backend(backend);
        self
    }

    pub fn config(&self) -> &LeastSquaresConfig {
        &self.config
    }
}

impl Optimization for LeastSquares {
    fn core(&self) -> &OptimizationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        &mut self.core
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        self.core.check_assets(data)?;
        let bm_series = data.bm_series.as_ref().ok_or_else(|| {
            FolioQpError::ConfigError("least squares requires a benchmark series".to_string())
        })?;
        if bm_series.len() != data.return_series.num_periods() {
            return Err(FolioQpError::Dimension(format!(
                "benchmark has {} periods, return series has {}",
                bm_series.len(),
                data.return_series.num_periods()
            )));
        }

        let (x, y) = if self.config.log_transform {
            (
                data.return_series.log_transform().values().clone(),
                bm_series.map(f64::ln_1p),
            )
        } else {
            (data.return_series.values().clone(), bm_series.clone())
        };
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FolioQpError::Numerical(
                "returns must be greater than -1 for the log transform".to_string(),
            ));
        }

        let xt = x.transpose();
        let mut p = &xt * &x * 2.0;
        let q = -(&xt * &y) * 2.0;
        let constant = y.dot(&y);

        if self.config.l2_penalty != 0.0 {
            let n = x.ncols();
            p += DMatrix::<f64>::identity(n, n) * (2.0 * self.config.l2_penalty);
        }

        tracing::debug!(
            periods = x.nrows(),
            assets = x.ncols(),
            l2_penalty = self.config.l2_penalty,
            "least squares objective set"
        );
        Ok(self
            .core
            .replace_objective(Objective::quadratic(p, q).with_constant(constant)))
    }
}
