use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Variant;

/// How `stop` settles the winner of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "variant", rename_all = "snake_case")]
#[ts(export)]
pub enum WinnerSelection {
    /// Stop without a winner. One can still be declared later.
    #[default]
    None,
    /// Take the evaluator's winner if its recommendation is to stop.
    Evaluated,
    /// Operator override, whatever the numbers say.
    Manual(Variant),
}

impl WinnerSelection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Evaluated => "evaluated",
            Self::Manual(_) => "manual",
        }
    }
}
