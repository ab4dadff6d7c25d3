use folioqp_types::{FolioQpError, Result};
use nalgebra::{DMatrix, DVector};

/// `(M + M^T) / 2`
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    (matrix + matrix.transpose()) * 0.5
}

/// Validate that a matrix is positive semi-definite (PSD)
/// Uses eigenvalue decomposition
pub fn validate_psd(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }

    let symmetric = (0..matrix.nrows()).all(|row| {
        (row + 1..matrix.ncols()).all(|col| (matrix[(row, col)] - matrix[(col, row)]).abs() < tolerance)
    });
    if !symmetric {
        return false;
    }

    matrix
        .clone()
        .symmetric_eigen()
        .eigenvalues
        .iter()
        .all(|&lambda| lambda >= -tolerance)
}

/// Strict positive definiteness via Cholesky
pub fn is_positive_definite(matrix: &DMatrix<f64>) -> bool {
    matrix.is_square() && matrix.clone().cholesky().is_some()
}

/// Nearest symmetric matrix with all eigenvalues at least `floor`
pub fn make_positive_definite(matrix: &DMatrix<f64>, floor: f64) -> DMatrix<f64> {
    let eigen = symmetrize(matrix).symmetric_eigen();
    let clipped = DVector::from_iterator(
        eigen.eigenvalues.len(),
        eigen.eigenvalues.iter().map(|&lambda| lambda.max(floor)),
    );
    let q = &eigen.eigenvectors;
    symmetrize(&(q * DMatrix::from_diagonal(&clipped) * q.transpose()))
}

/// Dense inverse, failing with a numerical error when singular
pub fn invert(matrix: &DMatrix<f64>, what: &str) -> Result<DMatrix<f64>> {
    if !matrix.is_square() {
        return Err(FolioQpError::Dimension(format!(
            "{} must be square, got {}x{}",
            what,
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    matrix
        .clone()
        .try_inverse()
        .filter(|inv| inv.iter().all(|v| v.is_finite()))
        .ok_or_else(|| FolioQpError::Numerical(format!("{} is singular", what)))
}
