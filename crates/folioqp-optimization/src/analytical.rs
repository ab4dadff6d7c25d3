use folioqp_constraints::Constraints;
use folioqp_risk::invert;
use folioqp_types::{FolioQpError, Result};
use nalgebra::{DMatrix, DVector};

use crate::assembly::quadratic_term;
use crate::objective::Objective;
use crate::optimization::OptimizationResults;
use crate::turnover::TurnoverMode;

const SCALAR_PIVOT_TOLERANCE: f64 = 1e-14;

/// Closed-form minimiser of `0.5 x'Px` subject to `A x = b`:
///
/// `x = P^-1 A' (A P^-1 A')^-1 b`
pub fn solve_equality_constrained(
    p: &DMatrix<f64>,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>> {
    let n = p.nrows();
    if a.ncols() != n || a.nrows() != b.len() {
        return Err(FolioQpError::Dimension(format!(
            "A is {}x{} with b of length {} for {} variables",
            a.nrows(),
            a.ncols(),
            b.len(),
            n
        )));
    }

    let p_inv = invert(p, "P")?;
    let p_inv_at = &p_inv * a.transpose();
    let schur = a * &p_inv_at;

    let schur_inv = if schur.shape() == (1, 1) {
        let pivot = schur[(0, 0)];
        if pivot.abs() < SCALAR_PIVOT_TOLERANCE || !pivot.is_finite() {
            return Err(FolioQpError::Numerical(
                "A P^-1 A' is singular".to_string(),
            ));
        }
        DMatrix::from_element(1, 1, 1.0 / pivot)
    } else {
        invert(&schur, "A P^-1 A'")?
    };

    let x = p_inv_at * schur_inv * b;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FolioQpError::Numerical(
            "analytical solution is not finite".to_string(),
        ));
    }
    Ok(x)
}

/// Variance-only objective under equality constraints, bypassing the QP solver
pub(crate) fn solve_analytical(
    objective: &Objective,
    constraints: &Constraints,
    turnover: &TurnoverMode,
) -> Result<OptimizationResults> {
    let form = constraints.to_matrix_form();
    if form.g.is_some() {
        return Err(FolioQpError::UnsupportedConstraint(
            "analytical solution does not exist with inequality constraints".to_string(),
        ));
    }
    let bounded = constraints.bounds().is_some_and(|(lower, upper)| {
        lower.iter().chain(upper.iter()).any(|v| v.is_finite())
    });
    if bounded {
        return Err(FolioQpError::UnsupportedConstraint(
            "analytical solution does not support box bounds".to_string(),
        ));
    }
    if turnover.is_active() {
        return Err(FolioQpError::UnsupportedConstraint(
            "analytical solution does not support turnover".to_string(),
        ));
    }
    let (a, b) = match (form.a, form.b) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(FolioQpError::UnsupportedConstraint(
                "analytical solution requires equality constraints".to_string(),
            ))
        }
    };

    let q = objective.q()?;
    if q.iter().any(|&v| v != 0.0) {
        return Err(FolioQpError::ConfigError(
            "analytical solution requires a zero linear term".to_string(),
        ));
    }

    let n = constraints.num_assets();
    let p = quadratic_term(objective, n)?;
    let x = solve_equality_constrained(&p, &a, &b)?;
    tracing::info!(assets = n, equalities = b.len(), "portfolio solved analytically");

    Ok(OptimizationResults {
        weights: constraints.ids().iter().cloned().zip(x.iter().copied()).collect(),
        status: true,
    })
}
