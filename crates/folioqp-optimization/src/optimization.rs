use folioqp_constraints::Constraints;
use folioqp_solver::{ClarabelSolver, SolverBackend};
use folioqp_types::{AssetId, FolioQpError, OptimizationData, Result, Weights};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assembly;
use crate::objective::{Coefficient, Objective};
use crate::params::{OptimizationParams, SolveMethod};
use crate::turnover::TurnoverMode;

/// Outcome of the most recent solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResults {
    pub weights: Weights,
    /// True when the solver reported an optimal (or almost optimal) point
    pub status: bool,
}

impl OptimizationResults {
    /// Weights in the given order, zero for ids without a weight
    pub fn to_vector(&self, ids: &[AssetId]) -> DVector<f64> {
        DVector::from_iterator(
            ids.len(),
            ids.iter().map(|id| self.weights.get(id).copied().unwrap_or(0.0)),
        )
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// State shared by every strategy: configuration, constraints, the current
/// objective, the last results and the solver backend.
pub struct OptimizationCore {
    params: OptimizationParams,
    constraints: Constraints,
    turnover: TurnoverMode,
    objective: Objective,
    results: Option<OptimizationResults>,
    backend: Arc<dyn SolverBackend + Send + Sync>,
}

impl OptimizationCore {
    /// Validate the parameters and resolve turnover handling once.
    ///
    /// `analytical_allowed` is only set by strategies with a closed form.
    pub(crate) fn new(
        params: OptimizationParams,
        constraints: Constraints,
        analytical_allowed: bool,
    ) -> Result<Self> {
        params.validate()?;
        if params.solve_method == SolveMethod::AnalyticalEquality && !analytical_allowed {
            return Err(FolioQpError::ConfigError(
                "analytical solve method is only available for minimum variance".to_string(),
            ));
        }
        let turnover = TurnoverMode::resolve(&constraints, &params)?;
        let backend = Arc::new(ClarabelSolver::with_settings(params.solver.clone()));

        Ok(OptimizationCore {
            params,
            constraints,
            turnover,
            objective: Objective::default(),
            results: None,
            backend,
        })
    }

    pub fn set_backend(&mut self, backend: Arc<dyn SolverBackend + Send + Sync>) {
        self.backend = backend;
    }

    pub fn params(&self) -> &OptimizationParams {
        &self.params
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Replace the constraints; turnover handling is resolved again
    pub fn set_constraints(&mut self, constraints: Constraints) -> Result<()> {
        self.turnover = TurnoverMode::resolve(&constraints, &self.params)?;
        self.constraints = constraints;
        Ok(())
    }

    pub fn turnover(&self) -> &TurnoverMode {
        &self.turnover
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn set_objective_coefficients(&mut self, coefficients: BTreeMap<String, Coefficient>) {
        self.objective.set_coefficients(coefficients);
    }

    /// Market data columns must follow the constraint asset order
    pub(crate) fn check_assets(&self, data: &OptimizationData) -> Result<()> {
        let expected = self.constraints.ids();
        if data.ids() == expected {
            return Ok(());
        }
        let mismatch = data
            .ids()
            .iter()
            .zip(expected.iter())
            .position(|(got, want)| got != want)
            .unwrap_or_else(|| data.ids().len().min(expected.len()));
        Err(FolioQpError::Dimension(format!(
            "data assets do not match constraint assets at position {} ({} vs {} assets)",
            mismatch,
            data.ids().len(),
            expected.len()
        )))
    }

    pub(crate) fn replace_objective(&mut self, objective: Objective) -> &Objective {
        self.objective = objective;
        &self.objective
    }

    pub fn results(&self) -> Option<&OptimizationResults> {
        self.results.as_ref()
    }

    pub(crate) fn store_results(&mut self, results: OptimizationResults) -> &OptimizationResults {
        self.results.insert(results)
    }

    /// Shared solve path through the general QP backend
    pub fn solve_general(&mut self) -> Result<&OptimizationResults> {
        let results = assembly::solve_general(
            &self.objective,
            &self.constraints,
            &self.turnover,
            self.backend.as_ref(),
        )?;
        Ok(self.store_results(results))
    }
}

/// Common interface of the portfolio strategies
pub trait Optimization {
    fn core(&self) -> &OptimizationCore;

    fn core_mut(&mut self) -> &mut OptimizationCore;

    /// Rebuild the objective from market data
    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective>;

    /// Solve the current objective; results replace those of any earlier solve
    fn solve(&mut self) -> Result<&OptimizationResults> {
        self.core_mut().solve_general()
    }

    fn objective(&self) -> &Objective {
        self.core().objective()
    }

    fn results(&self) -> Option<&OptimizationResults> {
        self.core().results()
    }

    fn constraints(&self) -> &Constraints {
        self.core().constraints()
    }

    fn params(&self) -> &OptimizationParams {
        self.core().params()
    }
}
