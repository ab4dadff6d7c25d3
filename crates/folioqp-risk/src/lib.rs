mod black_litterman;
mod covariance;
mod expected_return;
mod matrix_utils;

pub use black_litterman::{bl_posterior_mean, generate_views_from_scores, ViewMethod};
pub use covariance::{Covariance, CovarianceMethod, CovarianceSpec};
pub use expected_return::{ExpectedReturn, ExpectedReturnMethod, ExpectedReturnSpec};
pub use matrix_utils::{invert, is_positive_definite, make_positive_definite, symmetrize, validate_psd};
