use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use folioqp_types::Result;
use nalgebra::DMatrix;

use crate::{QpModel, QpSolution, QpStatus, SolverBackend, SolverSettings};

const SPARSITY_THRESHOLD: f64 = 1e-12;
const RANK_TOLERANCE: f64 = 1e-10;

/// Clarabel-based QP solver (interior point, pure Rust)
pub struct ClarabelSolver {
    settings: SolverSettings,
}

impl ClarabelSolver {
    /// Create a new Clarabel solver with default settings
    pub fn new() -> Self {
        Self::with_settings(SolverSettings::default())
    }

    pub fn with_settings(settings: SolverSettings) -> Self {
        ClarabelSolver { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn clarabel_settings(&self) -> DefaultSettings<f64> {
        let mut settings = DefaultSettings::default();
        settings.verbose = self.settings.verbose;
        settings.max_iter = self.settings.max_iter;
        settings.tol_gap_abs = self.settings.tol_gap_abs;
        settings.tol_gap_rel = self.settings.tol_gap_rel;
        settings.tol_feas = self.settings.tol_feas;
        settings
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ClarabelSolver {
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution> {
        model.validate()?;

        let conic = ConicForm::from_model(model);
        if conic.cones.is_empty() {
            return Ok(solve_unconstrained(model));
        }

        let p_csc = to_clarabel_csc(&model.p, true);
        let a_csc = to_clarabel_csc(&conic.a, false);

        tracing::debug!(
            vars = model.num_vars(),
            rows = conic.b.len(),
            "solving QP with clarabel"
        );

        let mut solver = DefaultSolver::new(
            &p_csc,
            model.q.as_slice(),
            &a_csc,
            &conic.b,
            &conic.cones,
            self.clarabel_settings(),
        );

        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => QpStatus::Optimal,
            SolverStatus::AlmostSolved => QpStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                QpStatus::PrimalInfeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                QpStatus::DualInfeasible
            }
            SolverStatus::MaxIterations => QpStatus::MaxIterations,
            _ => QpStatus::Unsolved,
        };

        let x = clamp_to_simple_bounds(model, solver.solution.x.clone());

        Ok(QpSolution {
            x,
            objective: solver.solution.obj_val,
            status,
            iterations: solver.info.iterations as usize,
        })
    }
}

/// Rows in Clarabel's `A x + s = b, s in K` form.
///
/// Equalities (`l == u`) go first into a zero cone; finite one-sided bounds
/// follow in a nonnegative cone:
///  - lower: `(Ax)_i >= l_i` → `-A_i x + s = -l_i`
///  - upper: `(Ax)_i <= u_i` → `A_i x + s = u_i`
struct ConicForm {
    a: DMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ConicForm {
    fn from_model(model: &QpModel) -> Self {
        let n = model.num_vars();
        let m = model.num_constraints();

        let mut rows: Vec<(usize, f64, f64)> = Vec::new(); // (source row, sign, rhs)
        for i in (0..m).filter(|&i| model.is_equality(i)) {
            rows.push((i, 1.0, model.u[i]));
        }
        let num_eq = rows.len();

        for i in (0..m).filter(|&i| !model.is_equality(i)) {
            if model.l[i].is_finite() {
                rows.push((i, -1.0, -model.l[i]));
            }
            if model.u[i].is_finite() {
                rows.push((i, 1.0, model.u[i]));
            }
        }
        let num_ineq = rows.len() - num_eq;

        let mut a = DMatrix::zeros(rows.len(), n);
        let mut b = Vec::with_capacity(rows.len());
        for (row_idx, &(i, sign, rhs)) in rows.iter().enumerate() {
            for j in 0..n {
                a[(row_idx, j)] = sign * model.a[(i, j)];
            }
            b.push(rhs);
        }

        let mut cones = Vec::new();
        if num_eq > 0 {
            cones.push(SupportedConeT::ZeroConeT(num_eq));
        }
        if num_ineq > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(num_ineq));
        }

        ConicForm { a, b, cones }
    }
}

/// No constraint rows: minimiser solves `P x = -q`.
///
/// Positive definite P goes through Cholesky. A singular P still has a
/// (minimum-norm) minimiser when `q` lies in the range of P; otherwise the
/// objective is unbounded below.
fn solve_unconstrained(model: &QpModel) -> QpSolution {
    let n = model.num_vars();
    let rhs = -&model.q;

    if let Some(chol) = model.p.clone().cholesky() {
        let x = chol.solve(&rhs);
        return QpSolution {
            objective: model.objective(&x),
            x: x.as_slice().to_vec(),
            status: QpStatus::Optimal,
            iterations: 0,
        };
    }

    let svd = model.p.clone().svd(true, true);
    let scale = svd.singular_values.max().max(1.0);
    let bounded = svd
        .solve(&rhs, RANK_TOLERANCE * scale)
        .ok()
        .filter(|x| (&model.p * x - &rhs).amax() <= RANK_TOLERANCE.sqrt() * scale.max(rhs.amax()));

    match bounded {
        Some(x) => {
            tracing::debug!("unconstrained QP with singular P, using minimum-norm minimiser");
            QpSolution {
                objective: model.objective(&x),
                x: x.as_slice().to_vec(),
                status: QpStatus::Optimal,
                iterations: 0,
            }
        }
        None => {
            tracing::warn!("unconstrained QP is unbounded below");
            QpSolution {
                x: vec![0.0; n],
                status: QpStatus::DualInfeasible,
                objective: f64::NAN,
                iterations: 0,
            }
        }
    }
}

/// Clamp solution to single-variable inequality rows to handle numerical errors
fn clamp_to_simple_bounds(model: &QpModel, mut x: Vec<f64>) -> Vec<f64> {
    for i in (0..model.num_constraints()).filter(|&i| !model.is_equality(i)) {
        let row = model.a.row(i);
        let mut nonzero = row
            .iter()
            .enumerate()
            .filter(|(_, &v)| v.abs() > 1e-10);
        let (var_idx, coeff) = match (nonzero.next(), nonzero.next()) {
            (Some((idx, &coeff)), None) => (idx, coeff),
            _ => continue,
        };

        // l <= coeff * x <= u, inequality flips for negative coefficients
        let (lo, hi) = if coeff > 0.0 {
            (model.l[i] / coeff, model.u[i] / coeff)
        } else {
            (model.u[i] / coeff, model.l[i] / coeff)
        };
        if lo.is_finite() {
            x[var_idx] = x[var_idx].max(lo);
        }
        if hi.is_finite() {
            x[var_idx] = x[var_idx].min(hi);
        }
    }
    x
}

/// Convert DMatrix to Clarabel CSC format (upper triangle only when `upper`)
fn to_clarabel_csc(mat: &DMatrix<f64>, upper: bool) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for col in 0..mat.ncols() {
        let last_row = if upper { col + 1 } else { mat.nrows() };
        for row in 0..last_row.min(mat.nrows()) {
            let val = mat[(row, col)];
            if val.abs() > SPARSITY_THRESHOLD {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}
