use folioqp_constraints::Constraints;
use folioqp_risk::{CovarianceSpec, ExpectedReturnSpec, ViewMethod};
use folioqp_solver::SolverSettings;
use folioqp_types::{FolioQpError, Result, Weights};
use serde::{Deserialize, Serialize};

use crate::{BlackLitterman, LeastSquares, MeanVariance, MinVariance, ScoreVariance, Strategy};

/// How the assembled program is solved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// Interior point QP solver
    #[default]
    GeneralQp,
    /// Closed form for variance-only objectives under equality constraints
    AnalyticalEquality,
}

/// Parameters shared by all strategies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizationParams {
    pub solver: SolverSettings,
    pub solve_method: SolveMethod,
    /// Per-unit cost on `sum_i |x_i - x_init_i|`; only positive values are applied
    pub turnover_penalty: Option<f64>,
    pub x_init: Option<Weights>,
}

impl OptimizationParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(penalty) = self.turnover_penalty {
            if !(penalty >= 0.0) || !penalty.is_finite() {
                return Err(FolioQpError::ConfigError(format!(
                    "turnover_penalty must be a non-negative number, got {}",
                    penalty
                )));
            }
        }
        if let Some(x_init) = &self.x_init {
            if let Some((id, _)) = x_init.iter().find(|(_, w)| !w.is_finite()) {
                return Err(FolioQpError::ConfigError(format!(
                    "x_init weight for {} is not finite",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Penalty rate when it is set and positive
    pub fn active_penalty(&self) -> Option<f64> {
        self.turnover_penalty.filter(|&rate| rate > 0.0)
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(FolioQpError::ConfigError(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(FolioQpError::ConfigError(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeastSquaresConfig {
    /// Fit on `ln(1 + r)` instead of simple returns
    pub log_transform: bool,
    /// Ridge coefficient `lambda` in `lambda * ||x||^2`
    pub l2_penalty: f64,
}

impl LeastSquaresConfig {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("l2_penalty", self.l2_penalty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeanVarianceConfig {
    pub risk_aversion: f64,
    pub covariance: CovarianceSpec,
    pub expected_return: ExpectedReturnSpec,
}

impl Default for MeanVarianceConfig {
    fn default() -> Self {
        MeanVarianceConfig {
            risk_aversion: 1.0,
            covariance: CovarianceSpec::default(),
            expected_return: ExpectedReturnSpec::default(),
        }
    }
}

impl MeanVarianceConfig {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("risk_aversion", self.risk_aversion)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinVarianceConfig {
    pub covariance: CovarianceSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlackLittermanConfig {
    /// Score fields, each contributing one block of views
    pub fields: Vec<String>,
    pub risk_aversion: f64,
    /// Prior uncertainty, `Psi = tau_psi * Sigma`
    pub tau_psi: f64,
    /// View uncertainty, `Omega = tau_omega * I`
    pub tau_omega: f64,
    pub view_method: ViewMethod,
    pub scalefactor: f64,
    pub covariance: CovarianceSpec,
}

impl Default for BlackLittermanConfig {
    fn default() -> Self {
        BlackLittermanConfig {
            fields: Vec::new(),
            risk_aversion: 1.0,
            tau_psi: 1.0,
            tau_omega: 1.0,
            view_method: ViewMethod::default(),
            scalefactor: 1.0,
            covariance: CovarianceSpec::default(),
        }
    }
}

impl BlackLittermanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(FolioQpError::ConfigError(
                "Black-Litterman needs at least one score field".to_string(),
            ));
        }
        check_non_negative("risk_aversion", self.risk_aversion)?;
        check_positive("tau_psi", self.tau_psi)?;
        check_positive("tau_omega", self.tau_omega)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreVarianceConfig {
    /// Score field used as the linear term
    pub field: Option<String>,
    pub risk_aversion: f64,
    pub covariance: CovarianceSpec,
}

impl Default for ScoreVarianceConfig {
    fn default() -> Self {
        ScoreVarianceConfig {
            field: None,
            risk_aversion: 1.0,
            covariance: CovarianceSpec::default(),
        }
    }
}

impl ScoreVarianceConfig {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("risk_aversion", self.risk_aversion)
    }
}

/// Shared parameters plus the strategy specific section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[serde(bound(deserialize = "C: Deserialize<'de> + Default"))]
pub struct StrategySpec<C> {
    pub params: OptimizationParams,
    pub config: C,
}

/// Complete strategy configuration, tagged by `"strategy"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    LeastSquares(StrategySpec<LeastSquaresConfig>),
    MeanVariance(StrategySpec<MeanVarianceConfig>),
    MinVariance(StrategySpec<MinVarianceConfig>),
    BlackLitterman(StrategySpec<BlackLittermanConfig>),
    ScoreVariance(StrategySpec<ScoreVarianceConfig>),
}

impl StrategyConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Instantiate the configured strategy over `constraints`
    pub fn build(self, constraints: Constraints) -> Result<Strategy> {
        let strategy = match self {
            StrategyConfig::LeastSquares(spec) => {
                Strategy::LeastSquares(LeastSquares::new(spec.params, spec.config, constraints)?)
            }
            StrategyConfig::MeanVariance(spec) => {
                Strategy::MeanVariance(MeanVariance::new(spec.params, spec.config, constraints)?)
            }
            StrategyConfig::MinVariance(spec) => {
                Strategy::MinVariance(MinVariance::new(spec.params, spec.config, constraints)?)
            }
            StrategyConfig::BlackLitterman(spec) => Strategy::BlackLitterman(BlackLitterman::new(
                spec.params,
                spec.config,
                constraints,
            )?),
            StrategyConfig::ScoreVariance(spec) => {
                Strategy::ScoreVariance(ScoreVariance::new(spec.params, spec.config, constraints)?)
            }
        };
        Ok(strategy)
    }
}
