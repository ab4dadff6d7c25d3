use folioqp_types::{AssetId, FolioQpError, Result, Weights};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

use crate::bounds::{BoxConstraint, BoxType};
use crate::linear::{ConstraintSense, LinearConstraint};

/// L1 turnover limit: `sum_i |x_i - x0_i| <= rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct TurnoverConstraint {
    pub x0: Weights,
    pub rhs: f64,
}

impl TurnoverConstraint {
    /// Baseline weights in the given asset order, missing assets at zero
    pub fn baseline(&self, ids: &[AssetId]) -> DVector<f64> {
        DVector::from_iterator(
            ids.len(),
            ids.iter().map(|id| self.x0.get(id).copied().unwrap_or(0.0)),
        )
    }
}

/// Linear constraints in matrix form:
/// `G x <= h` and `A x = b`, `None` when the block is empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixForm {
    pub g: Option<DMatrix<f64>>,
    pub h: Option<DVector<f64>>,
    pub a: Option<DMatrix<f64>>,
    pub b: Option<DVector<f64>>,
}

/// Constraint container for a portfolio over an ordered asset universe
#[derive(Debug, Clone)]
pub struct Constraints {
    ids: Vec<AssetId>,
    bounds: BoxConstraint,
    linear: Vec<LinearConstraint>,
    turnover: Option<TurnoverConstraint>,
}

impl Constraints {
    pub fn new(ids: Vec<AssetId>) -> Self {
        let n = ids.len();
        Constraints {
            ids,
            bounds: BoxConstraint::none(n),
            linear: Vec::new(),
            turnover: None,
        }
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn num_assets(&self) -> usize {
        self.ids.len()
    }

    /// Set uniform box bounds for all assets
    pub fn add_box(
        &mut self,
        box_type: BoxType,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<&mut Self> {
        self.bounds = BoxConstraint::uniform(self.ids.len(), box_type, lower, upper)?;
        Ok(self)
    }

    /// Budget constraint `sum_i x_i (sense) rhs`
    pub fn add_budget(&mut self, rhs: f64, sense: ConstraintSense) -> &mut Self {
        let coefficients = self.ids.iter().map(|id| (id.clone(), 1.0)).collect();
        self.linear.push(LinearConstraint::new(coefficients, sense, rhs));
        self
    }

    /// Constraint on the summed weight of a group of assets
    pub fn add_group(
        &mut self,
        members: &[AssetId],
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<&mut Self> {
        let coefficients = members.iter().map(|id| (id.clone(), 1.0)).collect();
        self.add_linear(coefficients, sense, rhs)
    }

    /// Arbitrary linear row; every asset must belong to the universe
    pub fn add_linear(
        &mut self,
        coefficients: BTreeMap<AssetId, f64>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<&mut Self> {
        if let Some(unknown) = coefficients.keys().find(|id| !self.ids.contains(id)) {
            return Err(FolioQpError::AssetNotFound(unknown.to_string()));
        }
        self.linear.push(LinearConstraint::new(coefficients, sense, rhs));
        Ok(self)
    }

    /// L1 turnover budget relative to baseline weights `x0`
    pub fn add_l1_turnover(&mut self, x0: Weights, rhs: f64) -> Result<&mut Self> {
        if !(rhs >= 0.0) {
            return Err(FolioQpError::ConfigError(format!(
                "turnover budget must be non-negative, got {}",
                rhs
            )));
        }
        if let Some(unknown) = x0.keys().find(|id| !self.ids.contains(id)) {
            return Err(FolioQpError::AssetNotFound(unknown.to_string()));
        }
        self.turnover = Some(TurnoverConstraint { x0, rhs });
        Ok(self)
    }

    pub fn linear(&self) -> &[LinearConstraint] {
        &self.linear
    }

    pub fn box_constraint(&self) -> &BoxConstraint {
        &self.bounds
    }

    pub fn box_type(&self) -> BoxType {
        self.bounds.box_type
    }

    /// `(lb, ub)` unless no box is specified
    pub fn bounds(&self) -> Option<(DVector<f64>, DVector<f64>)> {
        if self.bounds.is_bounded() {
            Some((self.bounds.lower.clone(), self.bounds.upper.clone()))
        } else {
            None
        }
    }

    pub fn turnover(&self) -> Option<&TurnoverConstraint> {
        self.turnover.as_ref()
    }

    /// Stack linear rows into `G x <= h` and `A x = b`
    pub fn to_matrix_form(&self) -> MatrixForm {
        let n = self.ids.len();
        let mut g_rows: Vec<f64> = Vec::new();
        let mut h: Vec<f64> = Vec::new();
        let mut a_rows: Vec<f64> = Vec::new();
        let mut b: Vec<f64> = Vec::new();

        for constraint in &self.linear {
            let row = constraint.row(&self.ids);
            match constraint.sense {
                ConstraintSense::Eq => {
                    a_rows.extend(row);
                    b.push(constraint.rhs);
                }
                ConstraintSense::Le => {
                    g_rows.extend(row);
                    h.push(constraint.rhs);
                }
                ConstraintSense::Ge => {
                    g_rows.extend(row.into_iter().map(|v| -v));
                    h.push(-constraint.rhs);
                }
            }
        }

        let (g, h) = if h.is_empty() {
            (None, None)
        } else {
            (
                Some(DMatrix::from_row_slice(h.len(), n, &g_rows)),
                Some(DVector::from_vec(h)),
            )
        };
        let (a, b) = if b.is_empty() {
            (None, None)
        } else {
            (
                Some(DMatrix::from_row_slice(b.len(), n, &a_rows)),
                Some(DVector::from_vec(b)),
            )
        };

        tracing::debug!(
            inequalities = h.as_ref().map_or(0, |h| h.len()),
            equalities = b.as_ref().map_or(0, |b| b.len()),
            "constraints converted to matrix form"
        );

        MatrixForm { g, h, a, b }
    }
}
