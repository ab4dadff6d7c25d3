use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use folioqp_types::{FolioQpError, Result};

/// Variable metadata for tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarMeta {
    /// Portfolio weight of the asset at this index
    Weight(usize),
    /// Auxiliary `t_i >= |x_i - x0_i|` introduced by turnover linearisation
    TurnoverSlack(usize),
}

/// QP model in standard form:
/// minimize 0.5 * x^T P x + q^T x
/// subject to l <= A x <= u
#[derive(Debug, Clone)]
pub struct QpModel {
    /// Hessian matrix P (must be PSD)
    pub p: DMatrix<f64>,
    /// Linear term q
    pub q: DVector<f64>,
    /// Constraint matrix A
    pub a: DMatrix<f64>,
    /// Lower bounds l (`-inf` for none)
    pub l: DVector<f64>,
    /// Upper bounds u (`+inf` for none)
    pub u: DVector<f64>,
    /// Variable metadata
    pub var_meta: Vec<VarMeta>,
}

impl QpModel {
    /// Create a new QP model
    pub fn new(
        p: DMatrix<f64>,
        q: DVector<f64>,
        a: DMatrix<f64>,
        l: DVector<f64>,
        u: DVector<f64>,
        var_meta: Vec<VarMeta>,
    ) -> Self {
        QpModel { p, q, a, l, u, var_meta }
    }

    /// Get number of variables
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get number of constraints
    pub fn num_constraints(&self) -> usize {
        self.l.len()
    }

    /// Row `i` is an equality (`l_i == u_i`)
    pub fn is_equality(&self, i: usize) -> bool {
        self.l[i].is_finite() && self.l[i] == self.u[i]
    }

    /// Objective value 0.5 * x^T P x + q^T x
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.p * x)) + self.q.dot(x)
    }

    /// Validate model dimensions
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vars();
        let m = self.num_constraints();

        if self.p.nrows() != n || self.p.ncols() != n {
            return Err(FolioQpError::Dimension(format!(
                "P must be {}x{}, got {}x{}",
                n,
                n,
                self.p.nrows(),
                self.p.ncols()
            )));
        }

        if self.a.nrows() != m || self.a.ncols() != n {
            return Err(FolioQpError::Dimension(format!(
                "A must be {}x{}, got {}x{}",
                m,
                n,
                self.a.nrows(),
                self.a.ncols()
            )));
        }

        if self.u.len() != m {
            return Err(FolioQpError::Dimension(format!(
                "u length {} != num_constraints {}",
                self.u.len(),
                m
            )));
        }

        if self.var_meta.len() != n {
            return Err(FolioQpError::Dimension(format!(
                "var_meta length {} != num_vars {}",
                self.var_meta.len(),
                n
            )));
        }

        Ok(())
    }
}
