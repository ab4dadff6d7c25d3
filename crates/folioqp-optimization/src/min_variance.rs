use folioqp_constraints::Constraints;
use folioqp_risk::Covariance;
use folioqp_solver::SolverBackend;
use folioqp_types::{OptimizationData, Result};
use nalgebra::DVector;
use std::sync::Arc;

use crate::analytical::solve_analytical;
use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore, OptimizationResults};
use crate::params::{MinVarianceConfig, OptimizationParams, SolveMethod};

/// Minimum variance portfolio `min x'Sigma x`.
///
/// With [`SolveMethod::AnalyticalEquality`] the program is solved in closed
/// form, which requires equality constraints only.
pub struct MinVariance {
    core: OptimizationCore,
    covariance: Covariance,
}

impl MinVariance {
    pub fn new(
        params: OptimizationParams,
        config: MinVarianceConfig,
        constraints: Constraints,
    ) -> Result<Self> {
        Ok(MinVariance {
            core: OptimizationCore::new(params, constraints, true)?,
            covariance: Covariance::new(config.covariance),
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.core.set_backend(backend);
        self
    }

    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }
}

impl Optimization for MinVariance {
    fn core(&self) -> &OptimizationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        &mut self.core
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        self.core.check_assets(data)?;
        let covmat = self.covariance.estimate(&data.return_series, false)?;
        let q = DVector::zeros(covmat.nrows());
        Ok(self.core.replace_objective(Objective::quadratic(covmat * 2.0, q)))
    }

    fn solve(&mut self) -> Result<&OptimizationResults> {
        match self.core.params().solve_method {
            SolveMethod::GeneralQp => self.core.solve_general(),
            SolveMethod::AnalyticalEquality => {
                let results = solve_analytical(
                    self.core.objective(),
                    self.core.constraints(),
                    self.core.turnover(),
                )?;
                Ok(self.core.store_results(results))
            }
        }
    }
}
