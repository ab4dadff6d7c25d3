use folioqp_constraints::Constraints;
use folioqp_solver::QuadraticProgram;
use folioqp_types::{FolioQpError, Result};
use nalgebra::DVector;

use crate::params::OptimizationParams;

/// How turnover enters the program, fixed when a strategy is configured
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TurnoverMode {
    #[default]
    None,
    /// `sum_i |x_i - baseline_i| <= budget`
    Constraint { budget: f64, baseline: DVector<f64> },
    /// `rate * sum_i |x_i - baseline_i|` added to the objective
    Penalty { rate: f64, baseline: DVector<f64> },
}

impl TurnoverMode {
    /// A turnover constraint takes priority over a penalty
    pub fn resolve(constraints: &Constraints, params: &OptimizationParams) -> Result<Self> {
        if let Some(turnover) = constraints.turnover() {
            if params.active_penalty().is_some() {
                tracing::debug!("turnover constraint set, ignoring turnover_penalty");
            }
            return Ok(TurnoverMode::Constraint {
                budget: turnover.rhs,
                baseline: turnover.baseline(constraints.ids()),
            });
        }

        let Some(rate) = params.active_penalty() else {
            return Ok(TurnoverMode::None);
        };
        let x_init = params.x_init.as_ref().ok_or_else(|| {
            FolioQpError::ConfigError("turnover_penalty requires x_init".to_string())
        })?;
        if let Some(unknown) = x_init.keys().find(|id| !constraints.ids().contains(id)) {
            return Err(FolioQpError::AssetNotFound(unknown.to_string()));
        }

        let ids = constraints.ids();
        let baseline = DVector::from_iterator(
            ids.len(),
            ids.iter().map(|id| x_init.get(id).copied().unwrap_or(0.0)),
        );
        Ok(TurnoverMode::Penalty { rate, baseline })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, TurnoverMode::None)
    }

    pub fn apply(&self, qp: &mut QuadraticProgram) -> Result<()> {
        match self {
            TurnoverMode::None => Ok(()),
            TurnoverMode::Constraint { budget, baseline } => {
                qp.linearize_turnover_constraint(baseline, *budget)
            }
            TurnoverMode::Penalty { rate, baseline } => {
                qp.linearize_turnover_objective(baseline, *rate)
            }
        }
    }
}
