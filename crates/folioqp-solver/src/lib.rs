mod backend;
mod clarabel_backend;
mod qp_model;
mod quadratic_program;
mod settings;

pub use backend::{QpSolution, QpStatus, SolverBackend};
pub use clarabel_backend::ClarabelSolver;
pub use qp_model::{QpModel, VarMeta};
pub use quadratic_program::QuadraticProgram;
pub use settings::SolverSettings;
