//! URL targeting configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TargetingConfig {
    /// Compiled matchers kept in memory. Default: 256.
    pub matcher_cache_capacity: Option<u64>,
}

impl TargetingConfig {
    pub fn effective_matcher_cache_capacity(&self) -> u64 {
        self.matcher_cache_capacity
            .unwrap_or(defaults::DEFAULT_MATCHER_CACHE_CAPACITY)
    }
}
