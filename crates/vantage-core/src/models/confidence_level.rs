use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::VantageError;

/// Supported two-tailed confidence levels for the significance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConfidenceLevel {
    Ninety,
    #[default]
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    /// Level as a whole percentage (90, 95, 99).
    pub fn percent(self) -> u8 {
        match self {
            Self::Ninety => 90,
            Self::NinetyFive => 95,
            Self::NinetyNine => 99,
        }
    }

    /// Two-tailed critical z-value.
    pub fn critical_z(self) -> f64 {
        match self {
            Self::Ninety => 1.645,
            Self::NinetyFive => 1.96,
            Self::NinetyNine => 2.576,
        }
    }
}

impl TryFrom<u8> for ConfidenceLevel {
    type Error = VantageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            90 => Ok(Self::Ninety),
            95 => Ok(Self::NinetyFive),
            99 => Ok(Self::NinetyNine),
            other => Err(VantageError::invalid_argument(
                "confidence_level",
                format!("invalid confidence level {other} (expected 90, 95 or 99)"),
            )),
        }
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> Self {
        level.percent()
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
