use folioqp_types::{FolioQpError, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Kind of per-asset weight bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoxType {
    /// No box specified; the problem is unbounded in weight space
    #[default]
    NA,
    LongOnly,
    LongShort,
    Unbounded,
}

/// Per-asset lower/upper weight limits
#[derive(Debug, Clone, PartialEq)]
pub struct BoxConstraint {
    pub box_type: BoxType,
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
}

impl BoxConstraint {
    /// No bounds at all
    pub fn none(n: usize) -> Self {
        BoxConstraint {
            box_type: BoxType::NA,
            lower: DVector::from_element(n, f64::NEG_INFINITY),
            upper: DVector::from_element(n, f64::INFINITY),
        }
    }

    /// Uniform bounds for `n` assets, defaults depending on the box type:
    /// long-only `[0, 1]`, long-short `[-1, 1]`, unbounded `(-inf, inf)`
    pub fn uniform(
        n: usize,
        box_type: BoxType,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<Self> {
        let (lower, upper) = match box_type {
            BoxType::NA => return Ok(Self::none(n)),
            BoxType::Unbounded => (f64::NEG_INFINITY, f64::INFINITY),
            BoxType::LongOnly => {
                let lower = lower.unwrap_or(0.0);
                if lower < 0.0 {
                    return Err(FolioQpError::ConfigError(format!(
                        "long-only lower bound must be non-negative, got {}",
                        lower
                    )));
                }
                (lower, upper.unwrap_or(1.0))
            }
            BoxType::LongShort => (lower.unwrap_or(-1.0), upper.unwrap_or(1.0)),
        };

        if lower > upper {
            return Err(FolioQpError::ConfigError(format!(
                "lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }

        Ok(BoxConstraint {
            box_type,
            lower: DVector::from_element(n, lower),
            upper: DVector::from_element(n, upper),
        })
    }

    pub fn is_bounded(&self) -> bool {
        self.box_type != BoxType::NA
    }
}
