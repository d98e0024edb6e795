//! Assignment allocator configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Longest accepted visitor identifier. Default: 128.
    pub max_visitor_id_len: Option<usize>,
    /// Fixed RNG seed. Only meant for reproducible test runs.
    pub seed: Option<u64>,
}

impl AllocatorConfig {
    pub fn effective_max_visitor_id_len(&self) -> usize {
        self.max_visitor_id_len
            .unwrap_or(defaults::DEFAULT_MAX_VISITOR_ID_LEN)
    }
}
