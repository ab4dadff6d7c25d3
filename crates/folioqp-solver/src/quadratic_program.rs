use folioqp_types::{FolioQpError, Result};
use nalgebra::{DMatrix, DVector};

use crate::backend::{QpSolution, SolverBackend};
use crate::qp_model::{QpModel, VarMeta};

/// Portfolio QP in solver-neutral form:
///
/// minimize 0.5 * x^T P x + q^T x
/// subject to G x <= h, A x = b, lb <= x <= ub
///
/// The first `num_assets` variables are portfolio weights; turnover
/// linearisation appends one auxiliary variable per asset.
#[derive(Debug, Clone)]
pub struct QuadraticProgram {
    pub p: DMatrix<f64>,
    pub q: DVector<f64>,
    pub g: Option<DMatrix<f64>>,
    pub h: Option<DVector<f64>>,
    pub a: Option<DMatrix<f64>>,
    pub b: Option<DVector<f64>>,
    pub lb: Option<DVector<f64>>,
    pub ub: Option<DVector<f64>>,
    num_assets: usize,
}

impl QuadraticProgram {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        p: DMatrix<f64>,
        q: DVector<f64>,
        g: Option<DMatrix<f64>>,
        h: Option<DVector<f64>>,
        a: Option<DMatrix<f64>>,
        b: Option<DVector<f64>>,
        lb: Option<DVector<f64>>,
        ub: Option<DVector<f64>>,
    ) -> Result<Self> {
        let n = q.len();
        if p.shape() != (n, n) {
            return Err(FolioQpError::Dimension(format!(
                "P must be {}x{}, got {}x{}",
                n,
                n,
                p.nrows(),
                p.ncols()
            )));
        }
        check_block("G", "h", g.as_ref(), h.as_ref(), n)?;
        check_block("A", "b", a.as_ref(), b.as_ref(), n)?;
        for (name, bound) in [("lb", lb.as_ref()), ("ub", ub.as_ref())] {
            if let Some(bound) = bound {
                if bound.len() != n {
                    return Err(FolioQpError::Dimension(format!(
                        "{} has length {}, expected {}",
                        name,
                        bound.len(),
                        n
                    )));
                }
            }
        }

        Ok(QuadraticProgram {
            p,
            q,
            g,
            h,
            a,
            b,
            lb,
            ub,
            num_assets: n,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    pub fn is_linearized(&self) -> bool {
        self.num_vars() != self.num_assets
    }

    /// Hard turnover limit `sum_i |x_i - x_init_i| <= to_budget`
    pub fn linearize_turnover_constraint(
        &mut self,
        x_init: &DVector<f64>,
        to_budget: f64,
    ) -> Result<()> {
        self.add_deviation_variables(x_init)?;

        let n = self.num_assets;
        let mut budget_row = DMatrix::zeros(1, 2 * n);
        budget_row.columns_mut(n, n).fill(1.0);
        self.push_inequalities(budget_row, DVector::from_element(1, to_budget));

        tracing::debug!(assets = n, budget = to_budget, "turnover linearized as constraint");
        Ok(())
    }

    /// Linear turnover cost `turnover_penalty * sum_i |x_i - x_init_i|` added to the objective
    pub fn linearize_turnover_objective(
        &mut self,
        x_init: &DVector<f64>,
        turnover_penalty: f64,
    ) -> Result<()> {
        self.add_deviation_variables(x_init)?;

        let n = self.num_assets;
        self.q.rows_mut(n, n).fill(turnover_penalty);

        tracing::debug!(assets = n, penalty = turnover_penalty, "turnover linearized as penalty");
        Ok(())
    }

    /// Extend `x` to `[x; t]` with `x - t <= x_init`, `-x - t <= -x_init`, `t >= 0`
    fn add_deviation_variables(&mut self, x_init: &DVector<f64>) -> Result<()> {
        let n = self.num_assets;
        if self.is_linearized() {
            return Err(FolioQpError::ConfigError(
                "turnover is already linearized".to_string(),
            ));
        }
        if x_init.len() != n {
            return Err(FolioQpError::Dimension(format!(
                "turnover baseline has length {}, expected {}",
                x_init.len(),
                n
            )));
        }

        let mut p = DMatrix::zeros(2 * n, 2 * n);
        p.view_mut((0, 0), (n, n)).copy_from(&self.p);
        self.p = p;
        self.q = self.q.clone().resize_vertically(2 * n, 0.0);

        self.g = self.g.take().map(|g| g.resize_horizontally(2 * n, 0.0));
        self.a = self.a.take().map(|a| a.resize_horizontally(2 * n, 0.0));

        let identity = DMatrix::<f64>::identity(n, n);
        let mut deviation = DMatrix::zeros(2 * n, 2 * n);
        deviation.view_mut((0, 0), (n, n)).copy_from(&identity);
        deviation.view_mut((0, n), (n, n)).copy_from(&(-&identity));
        deviation.view_mut((n, 0), (n, n)).copy_from(&(-&identity));
        deviation.view_mut((n, n), (n, n)).copy_from(&(-&identity));
        let mut rhs = DVector::zeros(2 * n);
        rhs.rows_mut(0, n).copy_from(x_init);
        rhs.rows_mut(n, n).copy_from(&(-x_init));
        self.push_inequalities(deviation, rhs);

        let lb = self
            .lb
            .take()
            .unwrap_or_else(|| DVector::from_element(n, f64::NEG_INFINITY));
        let ub = self
            .ub
            .take()
            .unwrap_or_else(|| DVector::from_element(n, f64::INFINITY));
        self.lb = Some(lb.resize_vertically(2 * n, 0.0));
        self.ub = Some(ub.resize_vertically(2 * n, f64::INFINITY));

        Ok(())
    }

    fn push_inequalities(&mut self, rows: DMatrix<f64>, rhs: DVector<f64>) {
        let (g, h) = match (self.g.take(), self.h.take()) {
            (Some(g), Some(h)) => {
                let m = g.nrows();
                let k = rows.nrows();
                let mut stacked = g.resize_vertically(m + k, 0.0);
                stacked.rows_mut(m, k).copy_from(&rows);
                let mut h = h.resize_vertically(m + k, 0.0);
                h.rows_mut(m, k).copy_from(&rhs);
                (stacked, h)
            }
            _ => (rows, rhs),
        };
        self.g = Some(g);
        self.h = Some(h);
    }

    /// Solver-facing `l <= A x <= u` model: equalities, inequalities, then finite bounds
    pub fn to_model(&self) -> QpModel {
        let n = self.num_vars();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut l = Vec::new();
        let mut u = Vec::new();

        if let (Some(a), Some(b)) = (&self.a, &self.b) {
            for (row, &rhs) in a.row_iter().zip(b.iter()) {
                rows.push(row.iter().copied().collect());
                l.push(rhs);
                u.push(rhs);
            }
        }

        if let (Some(g), Some(h)) = (&self.g, &self.h) {
            for (row, &rhs) in g.row_iter().zip(h.iter()) {
                rows.push(row.iter().copied().collect());
                l.push(f64::NEG_INFINITY);
                u.push(rhs);
            }
        }

        for j in 0..n {
            let lo = self.lb.as_ref().map_or(f64::NEG_INFINITY, |lb| lb[j]);
            let hi = self.ub.as_ref().map_or(f64::INFINITY, |ub| ub[j]);
            if lo.is_finite() || hi.is_finite() {
                let mut row = vec![0.0; n];
                row[j] = 1.0;
                rows.push(row);
                l.push(lo);
                u.push(hi);
            }
        }

        let a = DMatrix::from_row_slice(rows.len(), n, &rows.concat());
        let var_meta = (0..n)
            .map(|j| {
                if j < self.num_assets {
                    VarMeta::Weight(j)
                } else {
                    VarMeta::TurnoverSlack(j - self.num_assets)
                }
            })
            .collect();

        QpModel::new(
            symmetrized(&self.p),
            self.q.clone(),
            a,
            DVector::from_vec(l),
            DVector::from_vec(u),
            var_meta,
        )
    }

    pub fn solve(&self, backend: &dyn SolverBackend) -> Result<QpSolution> {
        backend.solve_qp(&self.to_model())
    }
}

fn symmetrized(p: &DMatrix<f64>) -> DMatrix<f64> {
    (p + p.transpose()) * 0.5
}

fn check_block(
    mat_name: &str,
    rhs_name: &str,
    mat: Option<&DMatrix<f64>>,
    rhs: Option<&DVector<f64>>,
    n: usize,
) -> Result<()> {
    match (mat, rhs) {
        (None, None) => Ok(()),
        (Some(mat), Some(rhs)) => {
            if mat.ncols() != n || mat.nrows() != rhs.len() {
                Err(FolioQpError::Dimension(format!(
                    "{} is {}x{} with {} of length {}, expected {} columns",
                    mat_name,
                    mat.nrows(),
                    mat.ncols(),
                    rhs_name,
                    rhs.len(),
                    n
                )))
            } else {
                Ok(())
            }
        }
        _ => Err(FolioQpError::Dimension(format!(
            "{} and {} must be given together",
            mat_name, rhs_name
        ))),
    }
}
