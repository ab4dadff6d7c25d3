use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioQpError {
    #[error("Objective must contain '{0}'")]
    MissingCoefficient(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported constraint: {0}")]
    UnsupportedConstraint(String),

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Dimension mismatch: {0}")]
    Dimension(String),

    #[error("Solver error: {0}")]
    SolverError(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FolioQpError {
    fn from(err: serde_json::Error) -> Self {
        FolioQpError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FolioQpError>;
