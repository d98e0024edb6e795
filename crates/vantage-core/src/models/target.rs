use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How an experiment's target pattern is compared against a page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MatchType {
    Exact,
    Wildcard,
    Regex,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Wildcard => "wildcard",
            Self::Regex => "regex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(Self::Exact),
            "wildcard" => Some(Self::Wildcard),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

/// The page(s) an experiment runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UrlTarget {
    pub pattern: String,
    pub match_type: MatchType,
}

impl UrlTarget {
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Exact,
        }
    }

    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Wildcard,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Regex,
        }
    }
}
