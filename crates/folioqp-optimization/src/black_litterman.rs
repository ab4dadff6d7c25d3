use folioqp_constraints::Constraints;
use folioqp_risk::{bl_posterior_mean, generate_views_from_scores, Covariance};
use folioqp_solver::SolverBackend;
use folioqp_types::{FolioQpError, OptimizationData, Result};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore};
use crate::params::{BlackLittermanConfig, OptimizationParams};

/// Mean-variance on the Black-Litterman posterior mean.
///
/// The prior is the return implied by the capitalisation weights,
/// `mu_implied = gamma * Sigma * w_cap`. Each configured score field adds one
/// block of views; view uncertainty is `tau_omega * I` and prior
/// uncertainty `tau_psi * Sigma`.
pub struct BlackLitterman {
    core: OptimizationCore,
    config: BlackLittermanConfig,
    covariance: Covariance,
    posterior: Option<DVector<f64>>,
}

impl BlackLitterman {
    pub fn new(
        params: OptimizationParams,
        config: BlackLittermanConfig,
        constraints: Constraints,
    ) -> Result<Self> {
        config.validate()?;
        Ok(BlackLitterman {
            core: OptimizationCore::new(params, constraints, false)?,
            covariance: Covariance::new(config.covariance),
            config,
            posterior: None,
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.core.set_backend(backend);
        self
    }

    pub fn config(&self) -> &BlackLittermanConfig {
        &self.config
    }

    /// Covariance estimator holding the estimate of the last `set_objective`
    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }

    /// Posterior mean of the last `set_objective`
    pub fn posterior(&self) -> Option<&DVector<f64>> {
        self.posterior.as_ref()
    }

    fn stacked_views(
        &self,
        data: &OptimizationData,
        mu_implied: &DVector<f64>,
    ) -> Result<(DMatrix<f64>, DVector<f64>)> {
        let scores = data.scores.as_ref().ok_or_else(|| {
            FolioQpError::ConfigError("Black-Litterman requires scores".to_string())
        })?;

        let n = mu_implied.len();
        let k = self.config.fields.len() * n;
        let mut p = DMatrix::zeros(k, n);
        let mut q = DVector::zeros(k);
        let mut row = 0;
        for field in &self.config.fields {
            let field_scores = scores.field(field).ok_or_else(|| {
                FolioQpError::ConfigError(format!("unknown score field '{}'", field))
            })?;
            let (p_view, q_view) = generate_views_from_scores(
                field_scores,
                mu_implied,
                self.config.view_method,
                self.config.scalefactor,
            )?;
            let rows = q_view.len();
            p.view_mut((row, 0), (rows, n)).copy_from(&p_view);
            q.rows_mut(row, rows).copy_from(&q_view);
            row += rows;
        }
        Ok((p, q))
    }
}

impl Optimization for BlackLitterman {
    fn core(&self) -> &OptimizationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        &mut self.core
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        self.core.check_assets(data)?;
        let cap_weights = data.cap_weights.as_ref().ok_or_else(|| {
            FolioQpError::ConfigError("Black-Litterman requires cap_weights".to_string())
        })?;

        let sigma = self.covariance.estimate(&data.return_series, true)?;
        if cap_weights.len() != sigma.nrows() {
            return Err(FolioQpError::Dimension(format!(
                "{} cap weights for {} assets",
                cap_weights.len(),
                sigma.nrows()
            )));
        }
        let mu_implied = &sigma * cap_weights * self.config.risk_aversion;

        let (p_views, q_views) = self.stacked_views(data, &mu_implied)?;
        let omega = DMatrix::from_diagonal_element(q_views.len(), q_views.len(), self.config.tau_omega);
        let psi = &sigma * self.config.tau_psi;
        let posterior = bl_posterior_mean(&mu_implied, &p_views, &q_views, &psi, &omega)?;

        tracing::debug!(
            views = q_views.len(),
            fields = self.config.fields.len(),
            "Black-Litterman posterior computed"
        );

        let p = sigma * (2.0 * self.config.risk_aversion);
        let q = -&posterior;
        self.posterior = Some(posterior);
        Ok(self.core.replace_objective(Objective::quadratic(p, q)))
    }
}
