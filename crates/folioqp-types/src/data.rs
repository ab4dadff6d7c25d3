use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

use crate::asset::AssetId;
use crate::error::{FolioQpError, Result};

/// Periodic returns: one row per period, one column per asset
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    ids: Vec<AssetId>,
    values: DMatrix<f64>,
}

impl ReturnSeries {
    pub fn new(ids: Vec<AssetId>, values: DMatrix<f64>) -> Result<Self> {
        if ids.len() != values.ncols() {
            return Err(FolioQpError::Dimension(format!(
                "return series has {} columns but {} ids",
                values.ncols(),
                ids.len()
            )));
        }
        Ok(ReturnSeries { ids, values })
    }

    /// Build from row-major data (`periods` rows of `ids.len()` values)
    pub fn from_row_slice(ids: Vec<AssetId>, periods: usize, data: &[f64]) -> Result<Self> {
        if data.len() != periods * ids.len() {
            return Err(FolioQpError::Dimension(format!(
                "expected {} values for {} periods x {} assets, got {}",
                periods * ids.len(),
                periods,
                ids.len(),
                data.len()
            )));
        }
        Self::new(ids.clone(), DMatrix::from_row_slice(periods, ids.len(), data))
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn num_periods(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_assets(&self) -> usize {
        self.values.ncols()
    }

    /// Continuously compounded returns `log(1 + r)`
    pub fn log_transform(&self) -> ReturnSeries {
        ReturnSeries {
            ids: self.ids.clone(),
            values: self.values.map(|r| r.ln_1p()),
        }
    }
}

/// Cross-sectional scores, one vector per named field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreTable {
    ids: Vec<AssetId>,
    fields: BTreeMap<String, DVector<f64>>,
}

impl ScoreTable {
    pub fn new(ids: Vec<AssetId>) -> Self {
        ScoreTable {
            ids,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, scores: Vec<f64>) -> Result<Self> {
        self.insert(name, scores)?;
        Ok(self)
    }

    pub fn insert(&mut self, name: impl Into<String>, scores: Vec<f64>) -> Result<()> {
        let name = name.into();
        if scores.len() != self.ids.len() {
            return Err(FolioQpError::Dimension(format!(
                "score field '{}' has {} values for {} assets",
                name,
                scores.len(),
                self.ids.len()
            )));
        }
        self.fields.insert(name, DVector::from_vec(scores));
        Ok(())
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn field(&self, name: &str) -> Option<&DVector<f64>> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Inputs consumed by `set_objective` of the optimization strategies
#[derive(Debug, Clone)]
pub struct OptimizationData {
    pub return_series: ReturnSeries,
    pub bm_series: Option<DVector<f64>>,
    pub scores: Option<ScoreTable>,
    pub cap_weights: Option<DVector<f64>>,
}

impl OptimizationData {
    pub fn new(return_series: ReturnSeries) -> Self {
        OptimizationData {
            return_series,
            bm_series: None,
            scores: None,
            cap_weights: None,
        }
    }

    pub fn with_benchmark(mut self, bm_series: Vec<f64>) -> Result<Self> {
        if bm_series.len() != self.return_series.num_periods() {
            return Err(FolioQpError::Dimension(format!(
                "benchmark has {} periods, return series has {}",
                bm_series.len(),
                self.return_series.num_periods()
            )));
        }
        self.bm_series = Some(DVector::from_vec(bm_series));
        Ok(self)
    }

    pub fn with_scores(mut self, scores: ScoreTable) -> Result<Self> {
        if scores.ids() != self.return_series.ids() {
            return Err(FolioQpError::Dimension(
                "score ids do not match return series ids".to_string(),
            ));
        }
        self.scores = Some(scores);
        Ok(self)
    }

    pub fn with_cap_weights(mut self, cap_weights: Vec<f64>) -> Result<Self> {
        if cap_weights.len() != self.return_series.num_assets() {
            return Err(FolioQpError::Dimension(format!(
                "{} cap weights for {} assets",
                cap_weights.len(),
                self.return_series.num_assets()
            )));
        }
        self.cap_weights = Some(DVector::from_vec(cap_weights));
        Ok(self)
    }

    pub fn ids(&self) -> &[AssetId] {
        self.return_series.ids()
    }
}
