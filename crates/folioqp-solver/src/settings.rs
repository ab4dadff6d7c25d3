use serde::{Deserialize, Serialize};

/// Settings forwarded to the general QP solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub max_iter: u32,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_iter: 200,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            verbose: false,
        }
    }
}
