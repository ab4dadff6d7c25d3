use folioqp_types::Result;
use serde::{Deserialize, Serialize};

use crate::qp_model::QpModel;

/// QP solver status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QpStatus {
    Optimal,
    AlmostOptimal,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterations,
    Unsolved,
}

impl QpStatus {
    /// Whether the returned point can be trusted as a solution
    pub fn found(&self) -> bool {
        matches!(self, QpStatus::Optimal | QpStatus::AlmostOptimal)
    }
}

/// Solution from QP solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpSolution {
    pub x: Vec<f64>,
    pub status: QpStatus,
    pub objective: f64,
    pub iterations: usize,
}

impl QpSolution {
    pub fn found(&self) -> bool {
        self.status.found()
    }
}

/// Trait for QP solver backends
pub trait SolverBackend: Send + Sync {
    /// Solve a QP problem: minimize 0.5 * x^T P x + q^T x
    /// subject to l <= A x <= u
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution>;
}
