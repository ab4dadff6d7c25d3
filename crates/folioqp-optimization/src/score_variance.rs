use folioqp_constraints::Constraints;
use folioqp_risk::Covariance;
use folioqp_solver::SolverBackend;
use folioqp_types::{FolioQpError, OptimizationData, Result};
use nalgebra::DMatrix;
use std::sync::Arc;

use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore};
use crate::params::{OptimizationParams, ScoreVarianceConfig};

/// Score tilt with a variance penalty: `min gamma x'Sigma x - s'x`
pub struct ScoreVariance {
    core: OptimizationCore,
    config: ScoreVarianceConfig,
    covariance: Covariance,
}

impl ScoreVariance {
    pub fn new(
        params: OptimizationParams,
        config: ScoreVarianceConfig,
        constraints: Constraints,
    ) -> Result<Self> {
        config.validate()?;
        Ok(ScoreVariance {
            core: OptimizationCore::new(params, constraints, false)?,
            covariance: Covariance::new(config.covariance),
            config,
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.core.set_backend(backend);
        self
    }

    pub fn config(&self) -> &ScoreVarianceConfig {
        &self.config
    }
}

impl Optimization for ScoreVariance {
    fn core(&self) -> &OptimizationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        &mut self.core
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        self.core.check_assets(data)?;
        let field = self
            .config
            .field
            .as_deref()
            .ok_or_else(|| FolioQpError::ConfigError("Field must be specified".to_string()))?;
        let scores = data
            .scores
            .as_ref()
            .ok_or_else(|| FolioQpError::ConfigError("score variance requires scores".to_string()))?
            .field(field)
            .ok_or_else(|| FolioQpError::ConfigError(format!("unknown score field '{}'", field)))?;

        let n = scores.len();
        let risk_aversion = self.config.risk_aversion;
        let p = if risk_aversion != 0.0 {
            self.covariance.estimate(&data.return_series, false)? * (2.0 * risk_aversion)
        } else {
            // pure score maximisation, no risk term
            DMatrix::zeros(n, n)
        };

        Ok(self.core.replace_objective(Objective::quadratic(p, -scores)))
    }
}
