use folioqp_types::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a linear constraint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// `a'x = rhs`
    Eq,
    /// `a'x <= rhs`
    Le,
    /// `a'x >= rhs`
    Ge,
}

/// Single linear constraint row over named assets
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: BTreeMap<AssetId, f64>, // asset -> coefficient, absent = 0
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(coefficients: BTreeMap<AssetId, f64>, sense: ConstraintSense, rhs: f64) -> Self {
        LinearConstraint {
            coefficients,
            sense,
            rhs,
        }
    }

    /// Dense row in the given asset order
    pub fn row(&self, ids: &[AssetId]) -> Vec<f64> {
        ids.iter()
            .map(|id| self.coefficients.get(id).copied().unwrap_or(0.0))
            .collect()
    }
}
