use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an investable asset (ticker, ISIN, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        AssetId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an ordered id list from string slices
    pub fn list(ids: &[&str]) -> Vec<AssetId> {
        ids.iter().map(|id| AssetId::new(*id)).collect()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        AssetId::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        AssetId(s)
    }
}

/// Portfolio weights keyed by asset
pub type Weights = BTreeMap<AssetId, f64>;
