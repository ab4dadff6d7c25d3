use folioqp_constraints::Constraints;
use folioqp_risk::{Covariance, ExpectedReturn};
use folioqp_solver::SolverBackend;
use folioqp_types::{OptimizationData, Result};
use std::sync::Arc;

use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore};
use crate::params::{MeanVarianceConfig, OptimizationParams};

/// Markowitz trade-off `min gamma x'Sigma x - mu'x`
pub struct MeanVariance {
    core: OptimizationCore,
    config: MeanVarianceConfig,
    covariance: Covariance,
    expected_return: ExpectedReturn,
}

impl MeanVariance {
    pub fn new(
        params: OptimizationParams,
        config: MeanVarianceConfig,
        constraints: Constraints,
    ) -> Result<Self> {
        config.validate()?;
        Ok(MeanVariance {
            core: OptimizationCore::new(params, constraints, false)?,
            covariance: Covariance::new(config.covariance),
            expected_return: ExpectedReturn::new(config.expected_return),
            config,
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.core.set_backend(backend);
        self
    }

    pub fn config(&self) -> &MeanVarianceConfig {
        &self.config
    }

    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }

    pub fn expected_return(&self) -> &ExpectedReturn {
        &self.expected_return
    }
}

impl Optimization for MeanVariance {
    fn core(&self) -> &OptimizationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        &mut self.core
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        self.core.check_assets(data)?;
        let x = &data.return_series;
        let covmat = self.covariance.estimate(x, false)?;
        let mu = self.expected_return.estimate(x, false)?;

        let p = covmat * (2.0 * self.config.risk_aversion);
        Ok(self.core.replace_objective(Objective::quadratic(p, -mu)))
    }
}
