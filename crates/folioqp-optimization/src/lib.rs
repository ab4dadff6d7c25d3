//! Portfolio optimization strategies formulated as quadratic programs.
//!
//! Each strategy turns market data into an [`Objective`] (`P`, `q` and an
//! optional constant) via `set_objective`, then `solve` merges it with the
//! [`Constraints`](folioqp_constraints::Constraints), applies turnover
//! linearisation and hands the program to a [`SolverBackend`](folioqp_solver::SolverBackend).

mod analytical;
mod assembly;
mod black_litterman;
mod least_squares;
mod mean_variance;
mod min_variance;
mod objective;
mod optimization;
mod params;
mod score_variance;
mod strategy;
mod turnover;

pub use analytical::solve_equality_constrained;
pub use assembly::{build_quadratic_program, solve_general};
pub use black_litterman::BlackLitterman;
pub use least_squares::LeastSquares;
pub use mean_variance::MeanVariance;
pub use min_variance::MinVariance;
pub use objective::{Coefficient, Objective};
pub use optimization::{Optimization, OptimizationCore, OptimizationResults};
pub use params::{
    BlackLittermanConfig, LeastSquaresConfig, MeanVarianceConfig, MinVarianceConfig,
    OptimizationParams, ScoreVarianceConfig, SolveMethod, StrategyConfig, StrategySpec,
};
pub use score_variance::ScoreVariance;
pub use strategy::Strategy;
pub use turnover::TurnoverMode;

#[cfg(test)]
mod tests;
