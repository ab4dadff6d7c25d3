mod asset;
mod data;
mod error;

pub use asset::{AssetId, Weights};
pub use data::{OptimizationData, ReturnSeries, ScoreTable};
pub use error::{FolioQpError, Result};
