use folioqp_constraints::Constraints;
use folioqp_risk::{symmetrize, validate_psd};
use folioqp_solver::{QuadraticProgram, SolverBackend};
use folioqp_types::{FolioQpError, Result};
use nalgebra::DMatrix;

use crate::objective::Objective;
use crate::optimization::OptimizationResults;
use crate::turnover::TurnoverMode;

const PSD_TOLERANCE: f64 = 1e-9;

/// Symmetric part of `P`, checked to be `n x n` and positive semi-definite
pub(crate) fn quadratic_term(objective: &Objective, n: usize) -> Result<DMatrix<f64>> {
    let p = objective.p()?;
    if p.shape() != (n, n) {
        return Err(FolioQpError::Dimension(format!(
            "P is {}x{} for {} assets",
            p.nrows(),
            p.ncols(),
            n
        )));
    }
    let p = symmetrize(&p);
    if !validate_psd(&p, PSD_TOLERANCE * p.amax().max(1.0)) {
        return Err(FolioQpError::Numerical(
            "P is not positive semi-definite".to_string(),
        ));
    }
    Ok(p)
}

/// Merge the objective with the constraints and linearise turnover
pub fn build_quadratic_program(
    objective: &Objective,
    constraints: &Constraints,
    turnover: &TurnoverMode,
) -> Result<QuadraticProgram> {
    let n = constraints.num_assets();
    let p = quadratic_term(objective, n)?;
    let q = objective.q()?;
    if q.len() != n {
        return Err(FolioQpError::Dimension(format!(
            "q has length {} for {} assets",
            q.len(),
            n
        )));
    }

    let form = constraints.to_matrix_form();
    let (lb, ub) = match constraints.bounds() {
        Some((lb, ub)) => (Some(lb), Some(ub)),
        None => (None, None),
    };

    let mut qp = QuadraticProgram::new(p, q, form.g, form.h, form.a, form.b, lb, ub)?;
    turnover.apply(&mut qp)?;

    tracing::debug!(
        assets = n,
        vars = qp.num_vars(),
        turnover = turnover.is_active(),
        "quadratic program assembled"
    );
    Ok(qp)
}

/// Solve with a general QP backend and map the solution back to asset ids.
///
/// Auxiliary turnover variables are dropped. A solver that does not converge
/// yields `status == false` rather than an error.
pub fn solve_general(
    objective: &Objective,
    constraints: &Constraints,
    turnover: &TurnoverMode,
    backend: &dyn SolverBackend,
) -> Result<OptimizationResults> {
    let qp = build_quadratic_program(objective, constraints, turnover)?;
    let solution = qp.solve(backend)?;
    if solution.x.len() < constraints.num_assets() {
        return Err(FolioQpError::SolverError(format!(
            "backend returned {} values for {} assets",
            solution.x.len(),
            constraints.num_assets()
        )));
    }

    if !solution.found() {
        tracing::warn!(
            status = ?solution.status,
            iterations = solution.iterations,
            "QP solver did not find a solution"
        );
    }

    let weights = constraints
        .ids()
        .iter()
        .cloned()
        .zip(solution.x.iter().copied())
        .collect();

    tracing::info!(
        status = ?solution.status,
        objective = solution.objective,
        iterations = solution.iterations,
        "portfolio optimized"
    );

    Ok(OptimizationResults {
        weights,
        status: solution.found(),
    })
}
