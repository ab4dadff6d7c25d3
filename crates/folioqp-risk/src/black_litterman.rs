use folioqp_types::{FolioQpError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::matrix_utils::invert;

/// How scores are turned into views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMethod {
    /// One view per asset on its absolute expected return
    #[default]
    Absolute,
    /// One view per asset on its return relative to the cross-sectional average
    Relative,
}

/// Build a view block `(P, q)` from a score vector.
///
/// Absolute: `P = I`, `q = mu_implied + s * scores`.
/// Relative: `P = I - 11'/n`, `q = P mu_implied + s * (scores - mean(scores))`.
pub fn generate_views_from_scores(
    scores: &DVector<f64>,
    mu_implied: &DVector<f64>,
    method: ViewMethod,
    scalefactor: f64,
) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let n = scores.len();
    if mu_implied.len() != n {
        return Err(FolioQpError::Dimension(format!(
            "{} scores for {} implied returns",
            n,
            mu_implied.len()
        )));
    }
    if n == 0 {
        return Err(FolioQpError::Dimension("empty score vector".to_string()));
    }

    let views = match method {
        ViewMethod::Absolute => (
            DMatrix::identity(n, n),
            mu_implied + scores * scalefactor,
        ),
        ViewMethod::Relative => {
            let p = DMatrix::identity(n, n) - DMatrix::from_element(n, n, 1.0 / n as f64);
            let demeaned = scores.add_scalar(-scores.mean());
            let q = &p * mu_implied + demeaned * scalefactor;
            (p, q)
        }
    };
    Ok(views)
}

/// Black-Litterman posterior mean:
/// `(Psi^-1 + P' Omega^-1 P)^-1 (Psi^-1 mu_prior + P' Omega^-1 q)`
pub fn bl_posterior_mean(
    mu_prior: &DVector<f64>,
    p: &DMatrix<f64>,
    q: &DVector<f64>,
    psi: &DMatrix<f64>,
    omega: &DMatrix<f64>,
) -> Result<DVector<f64>> {
    let n = mu_prior.len();
    let k = q.len();
    if p.shape() != (k, n) || psi.shape() != (n, n) || omega.shape() != (k, k) {
        return Err(FolioQpError::Dimension(format!(
            "inconsistent Black-Litterman inputs: mu {}, P {:?}, q {}, Psi {:?}, Omega {:?}",
            n,
            p.shape(),
            k,
            psi.shape(),
            omega.shape()
        )));
    }

    let psi_inv = invert(psi, "Psi")?;
    let omega_inv = invert(omega, "Omega")?;
    let pt_omega_inv = p.transpose() * omega_inv;

    let precision = &psi_inv + &pt_omega_inv * p;
    let v = invert(&precision, "posterior precision")?;
    Ok(v * (psi_inv * mu_prior + pt_omega_inv * q))
}
