use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{StorageError, VantageError, VantageResult};

/// How new visitors are split between the two arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum AssignmentStrategy {
    /// Independent coin flip per visitor.
    #[default]
    FiftyFifty,
    /// Round-robin on the running assignment count (even → A, odd → B).
    Alternating,
    /// Weighted coin flip, `percent_a + percent_b == 100`.
    CustomSplit { percent_a: u8, percent_b: u8 },
}

impl AssignmentStrategy {
    /// Storage tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FiftyFifty => "fifty_fifty",
            Self::Alternating => "alternating",
            Self::CustomSplit { .. } => "custom_split",
        }
    }

    /// Rebuild from the storage tag and the stored A share.
    pub fn from_parts(kind: &str, percent_a: Option<u8>) -> VantageResult<Self> {
        match (kind, percent_a) {
            ("fifty_fifty", _) => Ok(Self::FiftyFifty),
            ("alternating", _) => Ok(Self::Alternating),
            ("custom_split", Some(a)) if a <= 100 => Ok(Self::CustomSplit {
                percent_a: a,
                percent_b: 100 - a,
            }),
            _ => Err(StorageError::InvalidColumnValue {
                column: "strategy".to_string(),
                value: format!("{kind}/{percent_a:?}"),
            }
            .into()),
        }
    }

    /// Probability that a new visitor lands in A, always within [0, 1].
    pub fn probability_a(self) -> f64 {
        match self {
            Self::FiftyFifty | Self::Alternating => 0.5,
            Self::CustomSplit { percent_a, .. } => f64::from(percent_a.min(100)) / 100.0,
        }
    }

    /// The A share to persist, only meaningful for `CustomSplit`.
    pub fn percent_a(self) -> Option<u8> {
        match self {
            Self::CustomSplit { percent_a, .. } => Some(percent_a),
            _ => None,
        }
    }

    /// Split percentages must each be within 0..=100 and sum to 100.
    pub fn validate(self) -> VantageResult<()> {
        if let Self::CustomSplit {
            percent_a,
            percent_b,
        } = self
        {
            if percent_a > 100 || percent_b > 100 {
                return Err(VantageError::invalid_argument(
                    "strategy",
                    format!("split percentages must be within 0..=100, got {percent_a}/{percent_b}"),
                ));
            }
            if u16::from(percent_a) + u16::from(percent_b) != 100 {
                return Err(VantageError::invalid_argument(
                    "strategy",
                    format!("split percentages must sum to 100, got {percent_a}/{percent_b}"),
                ));
            }
        }
        Ok(())
    }
}
