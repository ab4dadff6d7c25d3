use folioqp_types::{FolioQpError, Result};
use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Value of a single objective coefficient
#[derive(Debug, Clone, PartialEq)]
pub enum Coefficient {
    Matrix(DMatrix<f64>),
    Vector(DVector<f64>),
    Scalar(f64),
}

impl Coefficient {
    /// Dense matrix view; a scalar or length-1 vector becomes 1x1
    pub fn to_dense_matrix(&self, name: &str) -> Result<DMatrix<f64>> {
        match self {
            Coefficient::Matrix(m) => Ok(m.clone()),
            Coefficient::Scalar(s) => Ok(DMatrix::from_element(1, 1, *s)),
            Coefficient::Vector(v) if v.len() == 1 => Ok(DMatrix::from_element(1, 1, v[0])),
            Coefficient::Vector(v) => Err(FolioQpError::Dimension(format!(
                "'{}' must be a matrix, got a vector of length {}",
                name,
                v.len()
            ))),
        }
    }

    /// Dense vector view; single-row or single-column matrices are flattened
    pub fn to_dense_vector(&self, name: &str) -> Result<DVector<f64>> {
        match self {
            Coefficient::Vector(v) => Ok(v.clone()),
            Coefficient::Scalar(s) => Ok(DVector::from_element(1, *s)),
            Coefficient::Matrix(m) if m.ncols() == 1 => Ok(m.column(0).into_owned()),
            Coefficient::Matrix(m) if m.nrows() == 1 => Ok(m.row(0).transpose()),
            Coefficient::Matrix(m) => Err(FolioQpError::Dimension(format!(
                "'{}' must be a vector, got a {}x{} matrix",
                name,
                m.nrows(),
                m.ncols()
            ))),
        }
    }
}

impl From<DMatrix<f64>> for Coefficient {
    fn from(m: DMatrix<f64>) -> Self {
        Coefficient::Matrix(m)
    }
}

impl From<DVector<f64>> for Coefficient {
    fn from(v: DVector<f64>) -> Self {
        Coefficient::Vector(v)
    }
}

impl From<f64> for Coefficient {
    fn from(s: f64) -> Self {
        Coefficient::Scalar(s)
    }
}

/// Loosely typed coefficient as found in JSON documents
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoefficient {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl RawCoefficient {
    fn into_coefficient(self, name: &str) -> Result<Coefficient> {
        Ok(match self {
            RawCoefficient::Scalar(s) => Coefficient::Scalar(s),
            RawCoefficient::Vector(v) => Coefficient::Vector(DVector::from_vec(v)),
            RawCoefficient::Matrix(rows) => {
                let ncols = rows.first().map_or(0, Vec::len);
                if rows.iter().any(|row| row.len() != ncols) {
                    return Err(FolioQpError::Dimension(format!(
                        "'{}' has rows of different lengths",
                        name
                    )));
                }
                Coefficient::Matrix(DMatrix::from_row_slice(rows.len(), ncols, &rows.concat()))
            }
        })
    }
}

/// Named coefficients of a quadratic objective `0.5 x'Px + q'x + constant`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    coefficients: BTreeMap<String, Coefficient>,
}

impl Objective {
    pub fn new(coefficients: BTreeMap<String, Coefficient>) -> Self {
        Objective { coefficients }
    }

    pub fn quadratic(p: DMatrix<f64>, q: DVector<f64>) -> Self {
        let mut objective = Objective::default();
        objective.insert("P", p);
        objective.insert("q", q);
        objective
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.insert("constant", constant);
        self
    }

    /// Parse from a JSON object of named coefficients
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            FolioQpError::ConfigError("coefficients must be a mapping".to_string())
        })?;

        let mut coefficients = BTreeMap::new();
        for (name, raw) in map {
            let raw: RawCoefficient = serde_json::from_value(raw.clone())?;
            coefficients.insert(name.clone(), raw.into_coefficient(name)?);
        }
        Ok(Objective { coefficients })
    }

    pub fn coefficients(&self) -> &BTreeMap<String, Coefficient> {
        &self.coefficients
    }

    pub fn set_coefficients(&mut self, coefficients: BTreeMap<String, Coefficient>) {
        self.coefficients = coefficients;
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Coefficient>) {
        self.coefficients.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.get(name)
    }

    /// Quadratic term as a dense matrix
    pub fn p(&self) -> Result<DMatrix<f64>> {
        self.get("P")
            .ok_or_else(|| FolioQpError::MissingCoefficient("P".to_string()))?
            .to_dense_matrix("P")
    }

    /// Linear term as a dense vector
    pub fn q(&self) -> Result<DVector<f64>> {
        self.get("q")
            .ok_or_else(|| FolioQpError::MissingCoefficient("q".to_string()))?
            .to_dense_vector("q")
    }

    pub fn constant(&self) -> Option<f64> {
        match self.get("constant") {
            Some(Coefficient::Scalar(c)) => Some(*c),
            _ => None,
        }
    }

    /// `0.5 x'Px + q'x + constant`
    pub fn value(&self, x: &DVector<f64>) -> Result<f64> {
        let p = self.p()?;
        let q = self.q()?;
        Ok(0.5 * x.dot(&(&p * x)) + q.dot(x) + self.constant().unwrap_or(0.0))
    }
}
