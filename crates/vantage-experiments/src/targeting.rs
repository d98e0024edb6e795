//! URL targeting: compiled matchers cached with moka.

use std::sync::Arc;

use moka::sync::Cache;

use vantage_core::config::defaults::DEFAULT_MATCHER_CACHE_CAPACITY;
use vantage_core::errors::{VantageError, VantageResult};
use vantage_core::models::{MatchType, UrlTarget};

/// A target pattern ready to test URLs against.
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    /// Pattern with at most one trailing `/` removed.
    Exact(String),
    Wildcard(glob::Pattern),
    Regex(regex::Regex),
}

impl CompiledMatcher {
    /// Compile `target`, rejecting invalid globs and regexes.
    pub fn compile(target: &UrlTarget) -> VantageResult<Self> {
        match target.match_type {
            MatchType::Exact => Ok(Self::Exact(strip_one_slash(&target.pattern).to_string())),
            MatchType::Wildcard => glob::Pattern::new(&target.pattern)
                .map(Self::Wildcard)
                .map_err(|e| {
                    VantageError::invalid_argument("target", format!("invalid wildcard: {e}"))
                }),
            MatchType::Regex => regex::Regex::new(&target.pattern)
                .map(Self::Regex)
                .map_err(|e| {
                    VantageError::invalid_argument("target", format!("invalid regex: {e}"))
                }),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => strip_one_slash(url) == pattern,
            Self::Wildcard(pattern) => pattern.matches(url),
            Self::Regex(re) => re.is_match(url),
        }
    }
}

fn strip_one_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

/// Cache of compiled matchers keyed by target.
pub struct UrlMatcher {
    cache: Cache<UrlTarget, Arc<CompiledMatcher>>,
}

impl Default for UrlMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCHER_CACHE_CAPACITY)
    }
}

impl UrlMatcher {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Compiled matcher for `target`, compiling on first use.
    pub fn matcher(&self, target: &UrlTarget) -> VantageResult<Arc<CompiledMatcher>> {
        if let Some(hit) = self.cache.get(target) {
            return Ok(hit);
        }
        let compiled = Arc::new(CompiledMatcher::compile(target)?);
        self.cache.insert(target.clone(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn matches(&self, target: &UrlTarget, url: &str) -> VantageResult<bool> {
        Ok(self.matcher(target)?.matches(url))
    }

    /// Number of compiled matchers held.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
