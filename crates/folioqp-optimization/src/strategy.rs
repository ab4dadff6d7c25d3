use folioqp_solver::SolverBackend;
use folioqp_types::{OptimizationData, Result};
use std::sync::Arc;

use crate::objective::Objective;
use crate::optimization::{Optimization, OptimizationCore, OptimizationResults};
use crate::{BlackLitterman, LeastSquares, MeanVariance, MinVariance, ScoreVariance};

/// Closed set of supported strategies
pub enum Strategy {
    LeastSquares(LeastSquares),
    MeanVariance(MeanVariance),
    MinVariance(MinVariance),
    BlackLitterman(BlackLitterman),
    ScoreVariance(ScoreVariance),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::LeastSquares(_) => "least_squares",
            Strategy::MeanVariance(_) => "mean_variance",
            Strategy::MinVariance(_) => "min_variance",
            Strategy::BlackLitterman(_) => "black_litterman",
            Strategy::ScoreVariance(_) => "score_variance",
        }
    }

    fn inner(&self) -> &dyn Optimization {
        match self {
            Strategy::LeastSquares(s) => s,
            Strategy::MeanVariance(s) => s,
            Strategy::MinVariance(s) => s,
            Strategy::BlackLitterman(s) => s,
            Strategy::ScoreVariance(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Optimization {
        match self {
            Strategy::LeastSquares(s) => s,
            Strategy::MeanVariance(s) => s,
            Strategy::MinVariance(s) => s,
            Strategy::BlackLitterman(s) => s,
            Strategy::ScoreVariance(s) => s,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend + Send + Sync>) -> Self {
        self.inner_mut().core_mut().set_backend(backend);
        self
    }
}

impl Optimization for Strategy {
    fn core(&self) -> &OptimizationCore {
        self.inner().core()
    }

    fn core_mut(&mut self) -> &mut OptimizationCore {
        self.inner_mut().core_mut()
    }

    fn set_objective(&mut self, data: &OptimizationData) -> Result<&Objective> {
        tracing::debug!(strategy = self.name(), "setting objective");
        self.inner_mut().set_objective(data)
    }

    fn solve(&mut self) -> Result<&OptimizationResults> {
        tracing::debug!(strategy = self.name(), "solving");
        self.inner_mut().solve()
    }
}
