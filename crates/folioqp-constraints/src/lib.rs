mod bounds;
mod constraints;
mod linear;

pub use bounds::{BoxConstraint, BoxType};
pub use constraints::{Constraints, MatrixForm, TurnoverConstraint};
pub use linear::{ConstraintSense, LinearConstraint};
